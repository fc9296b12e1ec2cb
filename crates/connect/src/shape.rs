//! Result shaping: live results to view values.

use crate::modifier::ShapingMode;
use crate::view::ViewValue;
use livebind_reactive::LiveResults;

/// Shapes the current contents of `results` according to `mode`.
///
/// List values are materialized copies and do not follow later mutations of
/// the live results.
pub fn shape<R: LiveResults>(mode: &ShapingMode<R>, results: &R) -> ViewValue<R::Item> {
    match mode {
        ShapingMode::Unique => {
            if results.is_empty() {
                ViewValue::Unique(None)
            } else {
                ViewValue::Unique(results.get(0))
            }
        }
        ShapingMode::Count => ViewValue::Count(results.len()),
        ShapingMode::Extract(extractor) => ViewValue::Extracted(extractor(results)),
        ShapingMode::List => ViewValue::List(results.snapshot()),
    }
}
