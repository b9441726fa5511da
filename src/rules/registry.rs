use super::collection_rules::{ListAppendInLoopRule, MembershipTestRule};
use super::iter_rules::RangeLenIterationRule;
use super::sort_rules::SortInsideLoopRule;
use super::string_rules::StringConcatInLoopRule;
use super::Rule;

/// Get all registered rules, in report order
pub fn all_rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(StringConcatInLoopRule),
        Box::new(ListAppendInLoopRule),
        Box::new(RangeLenIterationRule),
        Box::new(MembershipTestRule),
        Box::new(SortInsideLoopRule),
    ]
}

/// Get a rule by its ID
pub fn get_rule(id: &str) -> Option<Box<dyn Rule>> {
    all_rules().into_iter().find(|r| r.id() == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::DetectionKind;

    #[test]
    fn test_registry_order_is_fixed() {
        let kinds: Vec<_> = all_rules().iter().map(|r| r.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                DetectionKind::StringConcatInLoop,
                DetectionKind::ListAppendInLoop,
                DetectionKind::RangeLenIteration,
                DetectionKind::MembershipTestOnSequence,
                DetectionKind::SortInsideLoop,
            ]
        );
    }

    #[test]
    fn test_rule_ids_are_unique() {
        let mut ids: Vec<_> = all_rules().iter().map(|r| r.id()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), all_rules().len());
    }

    #[test]
    fn test_get_rule() {
        assert!(get_rule("sort-in-loop").is_some());
        assert!(get_rule("clone-in-hot-loop").is_none());
    }
}
