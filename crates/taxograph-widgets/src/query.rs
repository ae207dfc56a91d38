//! Query segments: the backend-facing projection of a widget.

use crate::{CompoundWidget, WidgetError};
use serde::{Deserialize, Serialize};
use taxograph_tree::NodeIdentifier;

/// `{ "taxonomyRef": ..., "selectedPath": [ids...] }`. Always derived from a
/// live widget, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuerySegment {
    pub taxonomy_ref: String,
    pub selected_path: Vec<NodeIdentifier>,
}

/// Project `widget` into a query segment.
///
/// Identifiers are emitted in level order with the level tags dropped. They
/// are not checked against any tree.
pub fn to_query_segment(widget: &CompoundWidget) -> Result<QuerySegment, WidgetError> {
    let taxonomy_ref = widget
        .taxonomy_ref()
        .ok_or(WidgetError::MissingTaxonomyReference)?;

    let mut levels: Vec<_> = widget.selected_path().iter().collect();
    levels.sort_by_key(|entry| entry.level);

    Ok(QuerySegment {
        taxonomy_ref: taxonomy_ref.to_string(),
        selected_path: levels.into_iter().map(|entry| entry.value.clone()).collect(),
    })
}

impl TryFrom<&CompoundWidget> for QuerySegment {
    type Error = WidgetError;

    fn try_from(widget: &CompoundWidget) -> Result<Self, Self::Error> {
        to_query_segment(widget)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::make_empty;
    use serde_json::json;

    #[test]
    fn test_occupation_segment() {
        let widget = CompoundWidget::with_path(
            "Occupation",
            ["Manufacturing", "Wood workers", "Bandbox-maker"],
        );
        let segment = to_query_segment(&widget).unwrap();
        assert_eq!(
            serde_json::to_value(&segment).unwrap(),
            json!({
                "taxonomyRef": "Occupation",
                "selectedPath": ["Manufacturing", "Wood workers", "Bandbox-maker"]
            })
        );
    }

    #[test]
    fn test_digit_text_values_pass_through() {
        let widget = CompoundWidget::with_path("Place", ["007", "1990"]);
        let segment = to_query_segment(&widget).unwrap();
        assert_eq!(
            serde_json::to_value(&segment).unwrap(),
            json!({ "taxonomyRef": "Place", "selectedPath": ["007", "1990"] })
        );

        let numeric = CompoundWidget::with_path("Music", [1, 3]);
        assert_eq!(
            serde_json::to_value(to_query_segment(&numeric).unwrap()).unwrap(),
            json!({ "taxonomyRef": "Music", "selectedPath": [1, 3] })
        );
    }

    #[test]
    fn test_missing_taxonomy_fails_for_any_path() {
        let mut widget = make_empty();
        assert!(matches!(
            to_query_segment(&widget),
            Err(WidgetError::MissingTaxonomyReference)
        ));

        widget.push_level(1);
        widget.push_level(3);
        let err = to_query_segment(&widget).unwrap_err();
        assert!(matches!(err, WidgetError::MissingTaxonomyReference));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_empty_path_is_allowed() {
        let mut widget = make_empty();
        widget.choose_taxonomy("Music");
        let segment = QuerySegment::try_from(&widget).unwrap();
        assert_eq!(segment.taxonomy_ref, "Music");
        assert!(segment.selected_path.is_empty());
    }

    #[test]
    fn test_out_of_order_levels_are_sorted() {
        let widget: CompoundWidget = serde_json::from_value(json!({
            "taxonomyRef": "Music",
            "selectedPath": [{ "level": 2, "value": 3 }, { "level": 1, "value": 1 }]
        }))
        .unwrap();
        let segment = to_query_segment(&widget).unwrap();
        assert_eq!(
            segment.selected_path,
            vec![NodeIdentifier::from(1), NodeIdentifier::from(3)]
        );
    }
}
