use crate::models::warning::{Warning, WarningType};

/// Keep the warnings whose type is in `allowed`, preserving order.
///
/// An empty allowed set means "no filter": the input passes through
/// unchanged. Warnings without a mapped type are only visible when no
/// filter is set.
pub fn filter_by_types(warnings: Vec<Warning>, allowed: &[WarningType]) -> Vec<Warning> {
    if allowed.is_empty() {
        return warnings;
    }
    warnings
        .into_iter()
        .filter(|w| w.warning_type.is_some_and(|t| allowed.contains(&t)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn warning(id: &str, wtype: Option<WarningType>) -> Warning {
        let now = Utc::now();
        Warning {
            warning_id: id.to_string(),
            warning_type: wtype,
            warning_level: None,
            start_time: now,
            end_time: now,
            geometry: None,
            municipalities: Vec::new(),
            raw_data: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_filter_keeps_matching_types_in_order() {
        let input = vec![
            warning("a", Some(WarningType::Storm)),
            warning("b", Some(WarningType::Rain)),
            warning("c", Some(WarningType::Snow)),
        ];
        let allowed = [WarningType::Storm, WarningType::Snow];
        let out = filter_by_types(input, &allowed);
        let ids: Vec<_> = out.iter().map(|w| w.warning_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn test_empty_allowed_set_passes_everything() {
        let input = vec![
            warning("a", Some(WarningType::Heat)),
            warning("b", None),
        ];
        let out = filter_by_types(input, &[]);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_untyped_warning_is_hidden_by_a_filter() {
        let input = vec![warning("a", None)];
        let out = filter_by_types(input, &[WarningType::Storm]);
        assert!(out.is_empty());
    }
}
