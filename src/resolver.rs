use crate::schema::{Category, CategoryDetails, ExtractedFields, FlowType, PaymentMode};

/// Fills every category-dependent default on a draft.
///
/// Pure and idempotent: applying it twice to its own output yields no
/// change. The results are a starting point only; any later user edit is
/// accepted as-is, including logically inconsistent combinations.
///
/// `voucher_amount` is reset unconditionally: a voucher amount is always
/// supplied fresh per classification session, never carried over from the
/// primary extraction.
pub fn resolve_defaults(
    mut fields: ExtractedFields,
    details: Option<CategoryDetails>,
    category: Category,
) -> (ExtractedFields, CategoryDetails) {
    fields.payment_mode.get_or_insert(PaymentMode::default());
    fields.flow_type.get_or_insert(FlowType::default());
    fields
        .service_line
        .get_or_insert(category.default_service_line());
    fields.target_folder.get_or_insert(category.default_folder());
    fields.voucher_amount = 0.0;

    // Details surviving from an earlier resolution are kept only when they
    // match the draft's category; the other side is discarded wholesale.
    let details = match details {
        Some(existing) if existing.category() == category => existing,
        _ => CategoryDetails::defaults_for(category),
    };

    (fields, details)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{
        CostType, Currency, DepositAccount, FlowType, IncomeType, ServiceLine, TargetFolder,
    };

    fn sample_fields() -> ExtractedFields {
        ExtractedFields {
            vendor: "ACME SAC".to_string(),
            tax_id: "20123456789".to_string(),
            date: "2024-03-10".to_string(),
            amount: 500.0,
            currency: Some(Currency::PEN),
            invoice_number: "F001-100".to_string(),
            voucher_amount: 350.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_income_defaults() {
        let (fields, details) = resolve_defaults(sample_fields(), None, Category::Income);

        assert_eq!(fields.payment_mode, Some(PaymentMode::Contado));
        assert_eq!(fields.flow_type, Some(FlowType::Operating));
        assert_eq!(fields.service_line, Some(ServiceLine::AuditoriaTradicional));
        assert_eq!(fields.target_folder, Some(TargetFolder::Ventas));
        assert_eq!(fields.voucher_amount, 0.0);
        assert_eq!(
            details,
            CategoryDetails::Income {
                income_type: IncomeType::Ventas
            }
        );
    }

    #[test]
    fn test_expense_defaults() {
        let (fields, details) = resolve_defaults(sample_fields(), None, Category::Expense);

        assert_eq!(fields.service_line, Some(ServiceLine::EccosGasto));
        assert_eq!(fields.target_folder, Some(TargetFolder::Compras));
        assert_eq!(
            details,
            CategoryDetails::Expense {
                cost_type: CostType::Variable,
                deposited_to: DepositAccount::PagoDirecto
            }
        );
    }

    #[test]
    fn test_existing_values_survive_resolution() {
        let mut fields = sample_fields();
        fields.payment_mode = Some(PaymentMode::Credito);
        fields.service_line = Some(ServiceLine::Consultoria);

        let details = CategoryDetails::Expense {
            cost_type: CostType::Fijo,
            deposited_to: DepositAccount::BcpSoles,
        };
        let (fields, details) = resolve_defaults(fields, Some(details), Category::Expense);

        assert_eq!(fields.payment_mode, Some(PaymentMode::Credito));
        assert_eq!(fields.service_line, Some(ServiceLine::Consultoria));
        assert_eq!(
            details,
            CategoryDetails::Expense {
                cost_type: CostType::Fijo,
                deposited_to: DepositAccount::BcpSoles
            }
        );
    }

    #[test]
    fn test_mismatched_details_are_replaced() {
        let stale = CategoryDetails::Income {
            income_type: IncomeType::Prestamos,
        };
        let (_, details) = resolve_defaults(sample_fields(), Some(stale), Category::Expense);
        assert_eq!(details, CategoryDetails::defaults_for(Category::Expense));
    }

    #[test]
    fn test_resolution_is_idempotent() {
        for category in [Category::Income, Category::Expense] {
            for fields in [ExtractedFields::default(), sample_fields()] {
                let once = resolve_defaults(fields.clone(), None, category);
                let twice =
                    resolve_defaults(once.0.clone(), Some(once.1), category);
                assert_eq!(once, twice, "resolver must be idempotent for {:?}", category);
            }
        }
    }
}
