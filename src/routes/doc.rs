use utoipa::{OpenApi, openapi::OpenApi as OpenApiSpec};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        books::{BookList, BookSuggestion, BookSuggestionList, CoverImageUpload, CreateBookRequest, UpdateBookRequest},
        categories::{CategoryList, CreateCategoryRequest, UpdateCategoryRequest},
        customers::{CreateCustomerRequest, CustomerList, CustomerWithOrders, UpdateCustomerRequest},
        dashboard::DashboardSummary,
        orders::{CreateOrderRequest, OrderItemInput, OrderList, OrderWithItems, UpdateOrderRequest},
    },
    models::{Book, Category, Customer, Order, OrderItem},
    response::{ApiResponse, Meta},
    routes::{books, categories, customers, dashboard, health, orders, params},
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        dashboard::summary,
        books::list_books,
        books::quick_search,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        categories::list_categories,
        categories::get_category,
        categories::create_category,
        categories::update_category,
        categories::delete_category,
        customers::list_customers,
        customers::get_customer,
        customers::create_customer,
        customers::update_customer,
        customers::delete_customer,
        orders::list_orders,
        orders::get_order,
        orders::create_order,
        orders::update_order,
        orders::delete_order,
    ),
    components(
        schemas(
            Book,
            Category,
            Customer,
            Order,
            OrderItem,
            BookList,
            BookSuggestion,
            BookSuggestionList,
            CoverImageUpload,
            CreateBookRequest,
            UpdateBookRequest,
            CategoryList,
            CreateCategoryRequest,
            UpdateCategoryRequest,
            CustomerList,
            CustomerWithOrders,
            CreateCustomerRequest,
            UpdateCustomerRequest,
            OrderItemInput,
            OrderList,
            OrderWithItems,
            CreateOrderRequest,
            UpdateOrderRequest,
            DashboardSummary,
            params::Pagination,
            params::BookQuery,
            params::QuickSearchQuery,
            Meta,
            ApiResponse<Book>,
            ApiResponse<BookList>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderList>,
            ApiResponse<DashboardSummary>
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Dashboard", description = "Store-wide summary"),
        (name = "Books", description = "Book catalog endpoints"),
        (name = "Categories", description = "Category endpoints"),
        (name = "Customers", description = "Customer endpoints"),
        (name = "Orders", description = "Order endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
