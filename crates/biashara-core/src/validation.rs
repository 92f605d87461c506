//! # Validation Module
//!
//! The Sale Validator: structural and business-rule checks on a sale request.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP extractor (axum Json)                                   │
//! │  └── Malformed JSON, wrong types → 400                                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (pure, no I/O)                                   │
//! │  ├── Basket not empty, not oversized                                   │
//! │  ├── Payment method present and known                                  │
//! │  ├── Quantities positive, amounts finite and non-negative             │
//! │  └── Customer identity for credit sales                                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (quantity >= 0)                                             │
//! │  └── UNIQUE constraints                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every error names the request field it refers to, e.g.
//! `products[1].quantity`.

use crate::error::ValidationError;
use crate::money::Money;
use crate::sale::{SaleLine, SaleRequest, ValidatedSale};
use crate::types::PaymentMethod;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Sale Request
// =============================================================================

/// Validates a sale request and converts it into its typed form.
///
/// ## Rules (checked in this order)
/// 1. `products` is not empty
/// 2. `payment_method` is not blank
/// 3. `payment_method` is CASH, MPESA or CREDIT (any case)
/// 4. every line has `product_id > 0`, `quantity > 0` and a valid amount
/// 5. the line amounts sum to a total that fits in cents
/// 6. for CREDIT, `customer_name` and `customer_phone` are not blank
///
/// ## Example
/// ```rust
/// use biashara_core::sale::{SaleLineRequest, SaleRequest};
/// use biashara_core::validation::validate_sale_request;
/// use biashara_core::PaymentMethod;
///
/// let request = SaleRequest {
///     products: vec![SaleLineRequest {
///         product_id: 1,
///         quantity: 2,
///         note: None,
///         amount: 20.0,
///     }],
///     payment_method: "cash".to_string(),
///     ..Default::default()
/// };
///
/// let sale = validate_sale_request(&request).unwrap();
/// assert_eq!(sale.payment_method, PaymentMethod::Cash);
/// assert_eq!(sale.lines[0].amount.cents(), 2000);
/// ```
pub fn validate_sale_request(request: &SaleRequest) -> ValidationResult<ValidatedSale> {
    if request.products.is_empty() {
        return Err(ValidationError::Required {
            field: "products".to_string(),
        });
    }

    let payment_method = validate_payment_method(&request.payment_method)?;

    let lines = request
        .products
        .iter()
        .enumerate()
        .map(|(index, line)| {
            validate_positive(line.product_id, &format!("products[{}].product_id", index))?;
            validate_positive(line.quantity, &format!("products[{}].quantity", index))?;
            let amount = Money::from_decimal(line.amount, &format!("products[{}].amount", index))?;

            Ok(SaleLine {
                product_id: line.product_id,
                quantity: line.quantity,
                note: non_blank(&line.note),
                amount,
            })
        })
        .collect::<ValidationResult<Vec<_>>>()?;

    if lines
        .iter()
        .try_fold(Money::zero(), |total, line| total.checked_add(line.amount))
        .is_none()
    {
        return Err(ValidationError::InvalidFormat {
            field: "products".to_string(),
            reason: "basket total is too large".to_string(),
        });
    }

    let customer_name = non_blank(&request.customer_name);
    let customer_phone = non_blank(&request.customer_phone);

    if payment_method.is_credit() {
        // The first line is named so the caller can point at the basket
        let product_id = lines[0].product_id;
        if customer_name.is_none() {
            return Err(ValidationError::RequiredForCredit {
                field: "customer_name".to_string(),
                product_id,
            });
        }
        if customer_phone.is_none() {
            return Err(ValidationError::RequiredForCredit {
                field: "customer_phone".to_string(),
                product_id,
            });
        }
    }

    let amount_paid = request
        .amount_paid
        .map(|value| Money::from_decimal(value, "amount_paid"))
        .transpose()?;
    let remaining_balance = request
        .remaining_balance
        .map(|value| Money::from_decimal(value, "remaining_balance"))
        .transpose()?;

    Ok(ValidatedSale {
        lines,
        payment_method,
        customer_name,
        customer_phone,
        reference_number: non_blank(&request.reference_number),
        amount_paid,
        remaining_balance,
    })
}

/// Validates a payment method string.
///
/// ## Example
/// ```rust
/// use biashara_core::validation::validate_payment_method;
/// use biashara_core::PaymentMethod;
///
/// assert_eq!(validate_payment_method("Mpesa").unwrap(), PaymentMethod::Mpesa);
/// assert!(validate_payment_method("  ").is_err());
/// assert!(validate_payment_method("BITCOIN").is_err());
/// ```
pub fn validate_payment_method(input: &str) -> ValidationResult<PaymentMethod> {
    if input.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "payment_method".to_string(),
        });
    }

    PaymentMethod::parse(input).ok_or_else(|| ValidationError::NotAllowed {
        field: "payment_method".to_string(),
        allowed: PaymentMethod::ALL
            .iter()
            .map(|method| method.as_str().to_string())
            .collect(),
    })
}

// =============================================================================
// Helpers
// =============================================================================

fn validate_positive(value: i64, field: &str) -> ValidationResult<()> {
    if value <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Trims an optional string, treating whitespace-only as absent.
fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

// =============================================================================
// Unit Tests
// =============================================================================
