//! The product edit form: fields, validators and built-in messages.

use forms::{Field, Form, FormError, MessageCatalog, Validator};

pub fn product_form() -> Result<Form, FormError> {
    Form::new(vec![
        Field::new("productName", "").validators([
            Validator::required(),
            Validator::min_length(3),
            Validator::max_length(100),
        ]),
        Field::new("unitPrice", "").validator(Validator::range(1.0, 99_999.0)),
        Field::new("unitInStock", "").validator(Validator::range(1.0, 2000.0)),
        Field::new("categoryId", "").validator(Validator::range(1.0, 9_999_999.0)),
    ])
}

pub fn product_catalog() -> MessageCatalog {
    MessageCatalog::builder()
        .message("productName", "required", "Product name is required.")
        .message(
            "productName",
            "minlength",
            "Product name must be at least {requiredLength} characters.",
        )
        .message(
            "productName",
            "maxlength",
            "Product name cannot exceed {requiredLength} characters.",
        )
        .message(
            "unitPrice",
            "range",
            "Price of the product must be between {min} (lowest) and {max} (highest).",
        )
        .message(
            "unitInStock",
            "range",
            "Quantity of the product must be between {min} (lowest) and {max} (highest).",
        )
        .message("categoryId", "range", "Please select a category.")
        .build()
}
