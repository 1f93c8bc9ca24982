use thiserror::Error;

use crate::domain::inventory::{Sku, SkuError};

use super::scanner::{DirectiveKind, RawDirective};

/// Upper bound on a single directive's quantity.
pub const MAX_DIRECTIVE_QUANTITY: u32 = 1000;

/// The validated, typed form of a directive. Instances exist only for
/// directives that passed every field check; validation fails closed and
/// never defaults a field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    AddToQuote { sku: Sku, quantity: u32 },
    RemoveFromQuote { sku: Sku },
}

impl Command {
    /// Checked constructor for additions that do not come from scanned text
    /// (bill-of-materials bulk adds). Applies the same SKU and quantity
    /// policy as scanned directives.
    pub fn add_to_quote(raw_sku: &str, quantity: u32) -> Result<Self, DirectiveRejection> {
        let sku = Sku::parse(raw_sku)?;
        if quantity < 1 || quantity > MAX_DIRECTIVE_QUANTITY {
            return Err(DirectiveRejection::QuantityOutOfRange(quantity.to_string()));
        }
        Ok(Self::AddToQuote { sku, quantity })
    }

    pub fn sku(&self) -> &Sku {
        match self {
            Self::AddToQuote { sku, .. } | Self::RemoveFromQuote { sku } => sku,
        }
    }
}

/// Why a recognized directive produced no command. Consumed by the
/// diagnostics channel only; nothing here reaches user-visible text.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DirectiveRejection {
    #[error(transparent)]
    Sku(#[from] SkuError),
    #[error("quantity `{0}` is not a base-10 integer")]
    QuantityNotNumeric(String),
    #[error("quantity `{0}` is outside 1..=1000")]
    QuantityOutOfRange(String),
    #[error("add directive is missing its quantity field")]
    MissingQuantity,
}

pub fn validate(raw: &RawDirective) -> Result<Command, DirectiveRejection> {
    let sku = Sku::parse(&raw.raw_sku)?;
    match raw.kind {
        DirectiveKind::RemoveFromQuote => Ok(Command::RemoveFromQuote { sku }),
        DirectiveKind::AddToQuote => {
            let raw_quantity =
                raw.raw_quantity.as_deref().ok_or(DirectiveRejection::MissingQuantity)?;
            let quantity = parse_quantity(raw_quantity)?;
            Ok(Command::AddToQuote { sku, quantity })
        }
    }
}

fn parse_quantity(raw: &str) -> Result<u32, DirectiveRejection> {
    // digits only: no sign, no decimal point, no grouping
    if raw.is_empty() || !raw.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(DirectiveRejection::QuantityNotNumeric(raw.to_string()));
    }
    let value = raw
        .parse::<u64>()
        .map_err(|_| DirectiveRejection::QuantityOutOfRange(raw.to_string()))?;
    if value < 1 || value > u64::from(MAX_DIRECTIVE_QUANTITY) {
        return Err(DirectiveRejection::QuantityOutOfRange(raw.to_string()));
    }
    Ok(value as u32)
}
