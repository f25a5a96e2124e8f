use axum_bookstore_api::imaging::extract_public_id;

#[test]
fn extracts_folder_and_filename_after_version() {
    let url = "https://host/cloud/image/upload/v123/book-covers/abc.jpg";
    assert_eq!(
        extract_public_id(url).as_deref(),
        Some("book-covers/abc.jpg")
    );
}

#[test]
fn joins_nested_folders() {
    let url = "https://res.example.com/demo/image/upload/v99/covers/2024/pic.png";
    assert_eq!(
        extract_public_id(url).as_deref(),
        Some("covers/2024/pic.png")
    );
}

#[test]
fn trims_trailing_slash() {
    let url = "https://host/cloud/image/upload/v5/covers/pic.jpg/";
    assert_eq!(extract_public_id(url).as_deref(), Some("covers/pic.jpg"));
}

#[test]
fn missing_upload_segment_is_none() {
    let url = "https://host/cloud/image/v123/book-covers/abc.jpg";
    assert_eq!(extract_public_id(url), None);
}

#[test]
fn unparseable_url_is_none() {
    assert_eq!(extract_public_id("not a url"), None);
}

#[test]
fn too_few_segments_is_none() {
    assert_eq!(extract_public_id("https://host/upload"), None);
    assert_eq!(extract_public_id("https://host/a/upload"), None);
}

#[test]
fn nothing_after_version_is_none() {
    // The segment after `upload` is skipped as the version, leaving no id.
    assert_eq!(extract_public_id("https://host/image/upload/v1"), None);
}
