use axum_bookstore_api::response::Meta;
use axum_bookstore_api::routes::params::Pagination;

#[test]
fn total_pages_rounds_up() {
    let meta = Meta::new(1, 8, 17);
    assert_eq!(meta.total_pages, Some(3));

    let exact = Meta::new(1, 8, 16);
    assert_eq!(exact.total_pages, Some(2));

    let empty = Meta::new(1, 8, 0);
    assert_eq!(empty.total_pages, Some(0));
}

#[test]
fn pagination_defaults_to_page_one_of_eight() {
    let pagination = Pagination {
        page: None,
        per_page: None,
    };
    assert_eq!(pagination.normalize(), (1, 8, 0));
}

#[test]
fn pagination_clamps_out_of_range_values() {
    let pagination = Pagination {
        page: Some(0),
        per_page: Some(1000),
    };
    let (page, per_page, offset) = pagination.normalize();
    assert_eq!(page, 1);
    assert_eq!(per_page, 100);
    assert_eq!(offset, 0);
}

#[test]
fn offset_skips_prior_pages() {
    let pagination = Pagination {
        page: Some(3),
        per_page: Some(8),
    };
    assert_eq!(pagination.normalize(), (3, 8, 16));
}
