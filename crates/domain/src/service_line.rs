//! Service line: one itemized repair, part or labor entry on a service.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::Product;
use crate::error::{TechServError, ValidationError};
use crate::id::{EmployeeId, PeriphericId, ProductId, ServiceId, ServiceLineId, TrademarkId};

/// Series recorded when the device has no readable serial number.
pub const DEFAULT_SERIES: &str = "S/S";

/// A line belonging to exactly one [`Service`](crate::service::Service).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceLine {
    pub id: ServiceLineId,
    pub service_id: ServiceId,
    /// Type of work.
    pub product_id: Option<ProductId>,
    pub periferic_id: Option<PeriphericId>,
    pub trademark_id: Option<TrademarkId>,
    pub model: Option<String>,
    pub series: Option<String>,
    pub failure: Option<String>,
    pub reference_amount: Option<Decimal>,
    pub technical_id: Option<EmployeeId>,
}

impl ServiceLine {
    /// Create a builder for constructing a [`ServiceLine`].
    #[must_use]
    pub fn builder() -> ServiceLineBuilder {
        ServiceLineBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`TechServError::Validation`] when the reference amount is negative.
    pub fn validate(&self) -> Result<(), TechServError> {
        if self.reference_amount.is_some_and(|amount| amount.is_sign_negative()) {
            return Err(ValidationError::NegativeAmount.into());
        }
        Ok(())
    }

    /// Short human-facing reference used in error messages.
    #[must_use]
    pub fn label(&self) -> String {
        match (&self.model, &self.failure) {
            (Some(model), _) if !model.is_empty() => model.clone(),
            (_, Some(failure)) if !failure.is_empty() => failure.clone(),
            _ => self.id.to_string(),
        }
    }

    /// Fill the reference amount from the product's cost price when the
    /// line does not carry one yet.
    pub fn default_amount_from(&mut self, product: &Product) {
        if self.reference_amount.is_none() {
            self.reference_amount = Some(product.cost_price);
        }
    }
}

/// Step-by-step builder for [`ServiceLine`].
#[derive(Debug, Default)]
pub struct ServiceLineBuilder {
    id: Option<ServiceLineId>,
    service_id: Option<ServiceId>,
    product_id: Option<ProductId>,
    periferic_id: Option<PeriphericId>,
    trademark_id: Option<TrademarkId>,
    model: Option<String>,
    series: Option<String>,
    failure: Option<String>,
    reference_amount: Option<Decimal>,
    technical_id: Option<EmployeeId>,
}

impl ServiceLineBuilder {
    #[must_use]
    pub fn id(mut self, id: ServiceLineId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn service_id(mut self, service_id: ServiceId) -> Self {
        self.service_id = Some(service_id);
        self
    }

    #[must_use]
    pub fn product_id(mut self, product_id: ProductId) -> Self {
        self.product_id = Some(product_id);
        self
    }

    #[must_use]
    pub fn periferic_id(mut self, periferic_id: PeriphericId) -> Self {
        self.periferic_id = Some(periferic_id);
        self
    }

    #[must_use]
    pub fn trademark_id(mut self, trademark_id: TrademarkId) -> Self {
        self.trademark_id = Some(trademark_id);
        self
    }

    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    #[must_use]
    pub fn series(mut self, series: impl Into<String>) -> Self {
        self.series = Some(series.into());
        self
    }

    #[must_use]
    pub fn failure(mut self, failure: impl Into<String>) -> Self {
        self.failure = Some(failure.into());
        self
    }

    #[must_use]
    pub fn reference_amount(mut self, amount: Decimal) -> Self {
        self.reference_amount = Some(amount);
        self
    }

    #[must_use]
    pub fn technical_id(mut self, technical_id: EmployeeId) -> Self {
        self.technical_id = Some(technical_id);
        self
    }

    /// Consume the builder, validate, and return a [`ServiceLine`].
    ///
    /// # Errors
    ///
    /// Returns [`TechServError::Validation`] if the amount is negative.
    pub fn build(self) -> Result<ServiceLine, TechServError> {
        let line = ServiceLine {
            id: self.id.unwrap_or_default(),
            service_id: self.service_id.unwrap_or_default(),
            product_id: self.product_id,
            periferic_id: self.periferic_id,
            trademark_id: self.trademark_id,
            model: self.model,
            series: Some(self.series.unwrap_or_else(|| DEFAULT_SERIES.to_string())),
            failure: self.failure,
            reference_amount: self.reference_amount,
            technical_id: self.technical_id,
        };
        line.validate()?;
        Ok(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn should_default_series_when_missing() {
        let line = ServiceLine::builder().build().unwrap();
        assert_eq!(line.series.as_deref(), Some(DEFAULT_SERIES));
    }

    #[test]
    fn should_reject_negative_amount() {
        let result = ServiceLine::builder().reference_amount(dec!(-1)).build();
        assert!(matches!(
            result,
            Err(TechServError::Validation(ValidationError::NegativeAmount))
        ));
    }

    #[test]
    fn should_take_cost_price_when_amount_missing() {
        let product = Product::builder()
            .name("Screen replacement")
            .cost_price(dec!(45.00))
            .build()
            .unwrap();
        let mut line = ServiceLine::builder().product_id(product.id).build().unwrap();

        line.default_amount_from(&product);

        assert_eq!(line.reference_amount, Some(dec!(45.00)));
    }

    #[test]
    fn should_keep_explicit_amount_over_cost_price() {
        let product = Product::builder()
            .name("Screen replacement")
            .cost_price(dec!(45.00))
            .build()
            .unwrap();
        let mut line = ServiceLine::builder()
            .reference_amount(dec!(60))
            .build()
            .unwrap();

        line.default_amount_from(&product);

        assert_eq!(line.reference_amount, Some(dec!(60)));
    }

    #[test]
    fn should_label_with_model_then_failure() {
        let line = ServiceLine::builder()
            .model("XPS 13")
            .failure("no power")
            .build()
            .unwrap();
        assert_eq!(line.label(), "XPS 13");

        let line = ServiceLine::builder().failure("no power").build().unwrap();
        assert_eq!(line.label(), "no power");
    }
}
