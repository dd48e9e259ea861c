use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    db::DbHealth,
    dto::{
        auth::{LoginRequest, LoginResponse},
        categories::{CreateCategoryRequest, UpdateCategoryRequest},
        customers::{CreateCustomerRequest, UpdateCustomerRequest},
        employees::{CreateEmployeeRequest, UpdateEmployeeRequest},
        orders::{
            CheckoutLine, CheckoutRequest, CreateOrderRequest, OrderDetailRequest,
            ShipOrderRequest, UpdateOrderRequest, UpdateOrderStatusRequest,
        },
        product_images::{CreateProductImageRequest, UpdateProductImageRequest},
        products::{CreateProductRequest, UpdateProductRequest},
        reviews::{CreateReviewRequest, UpdateReviewRequest},
        shipping_addresses::{CreateShippingAddressRequest, UpdateShippingAddressRequest},
        sizes::{CreateSizeRequest, UpdateSizeRequest},
    },
    middleware::auth::Role,
    models::{
        Category, Customer, Employee, Order, OrderDetail, OrderDetailView, OrderView, Product,
        ProductImage, Review, ShippingAddress, Size,
    },
    response::Meta,
    routes::{
        categories, customers, employees, health, orders, product_images, products, reviews,
        shipping_addresses, sizes,
    },
    validation::{FieldError, ValidationErrors},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        categories::list_categories,
        categories::get_category,
        categories::create_category,
        categories::update_category,
        categories::delete_category,
        sizes::list_sizes,
        sizes::get_size,
        sizes::create_size,
        sizes::update_size,
        sizes::delete_size,
        products::list_products,
        products::get_product,
        products::create_product,
        products::update_product,
        products::delete_product,
        product_images::list_product_images,
        product_images::get_product_image,
        product_images::create_product_image,
        product_images::update_product_image,
        product_images::delete_product_image,
        reviews::list_reviews,
        reviews::get_review,
        reviews::create_review,
        reviews::update_review,
        reviews::delete_review,
        customers::register,
        customers::login,
        customers::me,
        customers::list_customers,
        customers::get_customer,
        customers::update_customer,
        customers::delete_customer,
        employees::login,
        employees::me,
        employees::list_employees,
        employees::create_employee,
        employees::get_employee,
        employees::update_employee,
        employees::delete_employee,
        shipping_addresses::list_shipping_addresses,
        shipping_addresses::get_shipping_address,
        shipping_addresses::create_shipping_address,
        shipping_addresses::update_shipping_address,
        shipping_addresses::delete_shipping_address,
        orders::list_orders,
        orders::list_my_orders,
        orders::get_order,
        orders::create_order,
        orders::update_order,
        orders::update_order_status,
        orders::ship_order,
        orders::delete_order,
        orders::checkout
    ),
    components(
        schemas(
            Category,
            Size,
            Product,
            ProductImage,
            Review,
            Customer,
            Employee,
            ShippingAddress,
            Order,
            OrderDetail,
            OrderView,
            OrderDetailView,
            CreateCategoryRequest,
            UpdateCategoryRequest,
            CreateSizeRequest,
            UpdateSizeRequest,
            CreateProductRequest,
            UpdateProductRequest,
            CreateProductImageRequest,
            UpdateProductImageRequest,
            CreateReviewRequest,
            UpdateReviewRequest,
            CreateCustomerRequest,
            UpdateCustomerRequest,
            CreateEmployeeRequest,
            UpdateEmployeeRequest,
            CreateShippingAddressRequest,
            UpdateShippingAddressRequest,
            CreateOrderRequest,
            UpdateOrderRequest,
            OrderDetailRequest,
            UpdateOrderStatusRequest,
            ShipOrderRequest,
            CheckoutRequest,
            CheckoutLine,
            LoginRequest,
            LoginResponse,
            Role,
            DbHealth,
            FieldError,
            ValidationErrors,
            Meta
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Categories", description = "Product categories"),
        (name = "Sizes", description = "Size catalog"),
        (name = "Products", description = "Product catalog"),
        (name = "Product images", description = "Images attached to products"),
        (name = "Reviews", description = "Customer reviews"),
        (name = "Customers", description = "Customer accounts and sessions"),
        (name = "Employees", description = "Employee accounts and sessions"),
        (name = "Shipping addresses", description = "Delivery addresses"),
        (name = "Orders", description = "Orders with embedded line items"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
