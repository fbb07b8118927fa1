use serde::{Deserialize, Serialize};

/// Structured shipment data pulled from a logistics document.
///
/// Every field is always present in serialized output; values that could not
/// be extracted serialize as `null`. `currency` defaults to `"USD"` when the
/// document names no currency.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShipmentFields {
    /// Load / reference / BOL / PRO identifier.
    pub shipment_id: Option<String>,
    /// Party the freight is picked up from.
    pub shipper: Option<String>,
    /// Party the freight is delivered to.
    pub consignee: Option<String>,
    /// Pickup date, optionally with a time component, as written.
    pub pickup_datetime: Option<String>,
    /// Delivery date, optionally with a time component, as written.
    pub delivery_datetime: Option<String>,
    /// When the load was booked, as written.
    pub booking_datetime: Option<String>,
    /// Trailer / equipment type, e.g. "Dry Van".
    pub equipment_type: Option<String>,
    /// Shipment mode, e.g. "FTL" or "LTL".
    pub mode: Option<String>,
    /// Agreed rate as a number, commas and currency signs stripped.
    pub rate: Option<f64>,
    /// ISO-style currency code, uppercased.
    pub currency: Option<String>,
    /// Shipment weight as a number, unit stripped.
    pub weight: Option<f64>,
    /// Carrier company name.
    pub carrier_name: Option<String>,
}
