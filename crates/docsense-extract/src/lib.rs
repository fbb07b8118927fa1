//! Rule-based structured extraction of shipment fields from logistics
//! documents.
//!
//! Rate confirmations, bills of lading and similar documents carry the same
//! dozen facts in wildly different layouts. [`ShipmentExtractor`] pulls them
//! out with per-field chains of labeled regex strategies, filtered against
//! the section headers and sentence fragments that naive label matching
//! picks up. Deterministic by construction: the same text always yields the
//! same [`ShipmentFields`].

mod extractor;
mod fields;

pub use extractor::ShipmentExtractor;
pub use fields::ShipmentFields;
