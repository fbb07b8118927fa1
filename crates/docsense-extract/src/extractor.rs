use crate::fields::ShipmentFields;
use docsense_core::{DocsenseError, DocsenseResult};
use regex::Regex;
use tracing::debug;

/// Terms that mark an extracted value as a section header or sentence
/// fragment rather than real data.
const BLOCKLIST: &[&str] = &[
    "details",
    "name",
    "info",
    "information",
    "contact",
    "phone",
    "amount",
    "agreed",
    "location",
    "during",
    "follow",
    "driver",
    "procedures",
    "cedures",
    "operating",
    "hours",
    "normal",
    "standard",
    "receiving",
    "demo",
    "powered",
    "tms",
    "page",
    "email",
    "from the",
    "follow on",
    "on-",
    "the shipper",
    "the consignee",
    "agreed amount",
    "—",
    "-",
];

/// Date shape accepted for datetime fields: `3/15/24`, `03-15-2024 08:00 am`,
/// `2024-03-15` and similar.
const DATE_VALUE: &str = r"(\d{1,2}[-/]\d{1,2}[-/]\d{2,4}(?:\s+\d{1,2}:\d{2})?(?:\s*[ap]m)?|\d{4}[-/]\d{2}[-/]\d{2})";

/// Which shipment field a strategy chain feeds, for field-specific reject
/// rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    ShipmentId,
    Shipper,
    Consignee,
    PickupDatetime,
    DeliveryDatetime,
    BookingDatetime,
    EquipmentType,
    Mode,
    Rate,
    Currency,
    Weight,
    CarrierName,
}

/// Where a strategy's pattern is applied.
#[derive(Debug, Clone, Copy)]
enum Scope {
    /// Matched against each line independently; values never span lines.
    Line,
    /// Matched against the whole document, for stacked tabular layouts where
    /// the label and the value sit on different lines.
    Document,
}

/// One named way of finding a field value.
struct Strategy {
    name: &'static str,
    scope: Scope,
    pattern: Regex,
}

/// An ordered chain of strategies for one field. The first value that
/// survives cleanup and the garbage filter wins.
struct Chain {
    field: Field,
    max_len: usize,
    strategies: Vec<Strategy>,
}

fn strategy(name: &'static str, scope: Scope, pattern: &str) -> DocsenseResult<Strategy> {
    let pattern = Regex::new(pattern).map_err(|e| {
        DocsenseError::Config(format!("Invalid extraction pattern {name}: {e}"))
    })?;
    Ok(Strategy {
        name,
        scope,
        pattern,
    })
}

/// Rule-based extractor for the twelve shipment fields.
///
/// Each field has a prioritized chain of labeled regex strategies. Line-bound
/// strategies run first so labeled values ("Rate: $500") beat loose
/// document-wide fallbacks for stacked layouts ("Load\nID\nLD-1234").
/// Candidates pass a garbage filter before acceptance; the filter knows about
/// common section headers and sentence fragments that label-adjacent matching
/// tends to pick up.
pub struct ShipmentExtractor {
    shipment_id: Chain,
    shipper: Chain,
    consignee: Chain,
    pickup_datetime: Chain,
    delivery_datetime: Chain,
    booking_datetime: Chain,
    equipment_type: Chain,
    mode: Chain,
    rate: Chain,
    currency: Chain,
    weight: Chain,
    carrier_name: Chain,
    date_shape: Regex,
    id_shape: Regex,
    amount_shape: Regex,
    on_prefix: Regex,
}

impl ShipmentExtractor {
    /// Compiles every strategy pattern. Fails only on a malformed pattern,
    /// which is a build-time defect.
    #[allow(clippy::too_many_lines)]
    pub fn new() -> DocsenseResult<Self> {
        let shipment_id = Chain {
            field: Field::ShipmentId,
            max_len: 40,
            strategies: vec![
                strategy(
                    "load-label",
                    Scope::Line,
                    r"(?i)\b(?:load|reference|ref)[\s_]*(?:id|#|number)?[\s:]+([A-Za-z0-9-]{4,30})\b",
                )?,
                strategy(
                    "shipment-label",
                    Scope::Line,
                    r"(?i)\b(?:shipment|bol)[_\s]*(?:id|#|number)?[\s:]+([A-Za-z0-9-]{4,30})\b",
                )?,
                strategy(
                    "pro-number",
                    Scope::Line,
                    r"(?i)\bpro[\s_]*(?:id|#|number)[\s:]+([A-Za-z0-9-]{4,30})\b",
                )?,
                strategy(
                    "bill-of-lading",
                    Scope::Line,
                    r"(?i)\b(?:bill\s+of\s+lading|bol)[\s#:]+([A-Za-z0-9-]{4,30})\b",
                )?,
                strategy(
                    "stacked-load-id",
                    Scope::Document,
                    r"(?i)load\s+id\s+([A-Za-z0-9-]{4,30})",
                )?,
            ],
        };

        let shipper = Chain {
            field: Field::Shipper,
            max_len: 60,
            strategies: vec![
                strategy(
                    "shipper-label",
                    Scope::Line,
                    r"(?i)shipper(?:\s+name)?[\s:]+([A-Za-z0-9 &,.\-]+?)(?:consignee|carrier|phone|address|$)",
                )?,
                strategy(
                    "from-label",
                    Scope::Line,
                    r"(?i)^\s*from[\s:]+([A-Za-z0-9 &,.\-]{2,50}?)(?:to\s|consignee|$)",
                )?,
                strategy(
                    "bol-first-numbered",
                    Scope::Document,
                    r"(?is)shipper.*?\d+\.\s+([A-Za-z][A-Za-z]+)",
                )?,
                strategy(
                    "pickup-section",
                    Scope::Document,
                    r"(?i)pickup\s+([A-Za-z][A-Za-z0-9 &,.\-]+)(?:\n|$)",
                )?,
            ],
        };

        let consignee = Chain {
            field: Field::Consignee,
            max_len: 60,
            strategies: vec![
                strategy(
                    "consignee-label",
                    Scope::Line,
                    r"(?i)consignee(?:\s+name)?[\s:]+([A-Za-z0-9 &,.\-]+?)(?:carrier|shipper|phone|address|$)",
                )?,
                strategy(
                    "deliver-to",
                    Scope::Line,
                    r"(?i)(?:deliver\s+to|^\s*to)[\s:]+([A-Za-z0-9 &,.\-]{2,50}?)(?:from\s|carrier|$)",
                )?,
                strategy(
                    "bol-second-numbered",
                    Scope::Document,
                    r"(?is)\d+\.\s+[A-Za-z]+.*?\d+\.\s+([A-Za-z][A-Za-z]+)",
                )?,
                strategy(
                    "drop-section",
                    Scope::Document,
                    r"(?i)drop\s+([A-Za-z][A-Za-z0-9 &,.\-]+)(?:\n|$)",
                )?,
            ],
        };

        let pickup_datetime = Chain {
            field: Field::PickupDatetime,
            max_len: 50,
            strategies: vec![
                strategy(
                    "pickup-date",
                    Scope::Line,
                    &format!(r"(?i)(?:pickup|ship)(?:\s*(?:date|time|datetime))?[\s:]+{DATE_VALUE}"),
                )?,
                strategy(
                    "shipping-date",
                    Scope::Line,
                    &format!(r"(?i)shipping\s+date[\s:]+{DATE_VALUE}"),
                )?,
                strategy(
                    "pickup-freeform",
                    Scope::Line,
                    r"(?i)pickup[\s:]+([A-Za-z0-9 ,:\-]{3,40})",
                )?,
                strategy(
                    "stacked-ship-date",
                    Scope::Document,
                    r"(?i)ship\s+date\s+(\d{1,2}[-/]\d{1,2}[-/]\d{2,4})",
                )?,
            ],
        };

        let delivery_datetime = Chain {
            field: Field::DeliveryDatetime,
            max_len: 50,
            strategies: vec![
                strategy(
                    "delivery-date",
                    Scope::Line,
                    &format!(r"(?i)delivery(?:\s*(?:date|time|datetime))?[\s:]+{DATE_VALUE}"),
                )?,
                strategy(
                    "delivery-freeform",
                    Scope::Line,
                    r"(?i)delivery\s+time[\s:]+([A-Za-z0-9 ,:\-]{3,50})",
                )?,
                strategy(
                    "stacked-delivery-date",
                    Scope::Document,
                    r"(?i)delivery\s+date[\s:]+(\d{1,2}[-/]\d{1,2}[-/]\d{2,4})",
                )?,
            ],
        };

        let booking_datetime = Chain {
            field: Field::BookingDatetime,
            max_len: 50,
            strategies: vec![
                strategy(
                    "booking-date",
                    Scope::Line,
                    &format!(r"(?i)booking(?:\s*(?:date|time|datetime))?[\s:]+{DATE_VALUE}"),
                )?,
                strategy(
                    "booked-created",
                    Scope::Line,
                    &format!(r"(?i)(?:booked|created)[\s:]+{DATE_VALUE}"),
                )?,
                strategy(
                    "bare-on-date",
                    Scope::Line,
                    r"(?i)\bon\s+(\d{1,2}[-/]\d{1,2}[-/]\d{2,4}(?:\s+\d{1,2}:\d{2})?(?:\s*[ap]m)?)",
                )?,
            ],
        };

        let equipment_type = Chain {
            field: Field::EquipmentType,
            max_len: 25,
            strategies: vec![
                strategy(
                    "equipment-label",
                    Scope::Line,
                    r"(?i)equipment(?:\s+type)?[\s:]+([A-Za-z0-9 \-]{2,25})",
                )?,
                strategy(
                    "trailer-type",
                    Scope::Line,
                    r"(?i)trailer\s+type[\s:]+([A-Za-z0-9 \-]{2,25})",
                )?,
                strategy(
                    "known-type-before-price",
                    Scope::Line,
                    r"(?i)(flatbed|dry\s+van|reefer|step\s+deck|lowboy)[\s:]*\$",
                )?,
            ],
        };

        let mode = Chain {
            field: Field::Mode,
            max_len: 20,
            strategies: vec![
                strategy("mode-label", Scope::Line, r"(?i)\bmode[\s:]+([A-Za-z]{2,20})\b")?,
                strategy(
                    "shipment-mode",
                    Scope::Line,
                    r"(?i)shipment\s+mode[\s:]+([A-Za-z]{2,20})",
                )?,
                strategy(
                    "load-type",
                    Scope::Line,
                    r"(?i)load\s+type\s+([A-Za-z]{2,3})\b",
                )?,
                strategy(
                    "stacked-load-type",
                    Scope::Document,
                    r"(?i)load type\s*\n+([A-Za-z]{2,3})",
                )?,
            ],
        };

        let rate = Chain {
            field: Field::Rate,
            max_len: 15,
            strategies: vec![
                strategy(
                    "rate-label",
                    Scope::Line,
                    r"(?i)(?:rate|amount)[\s:]*\$?\s*([0-9,]+\.?[0-9]*)",
                )?,
                strategy("dollar-amount", Scope::Line, r"\$\s*([0-9,]+\.?[0-9]+)")?,
            ],
        };

        let currency = Chain {
            field: Field::Currency,
            max_len: 5,
            strategies: vec![
                strategy(
                    "currency-label",
                    Scope::Line,
                    r"(?i)currency[\s:]+([A-Za-z]{3})\b",
                )?,
                strategy("iso-code", Scope::Line, r"(?i)\b(usd|eur|gbp)\b")?,
                strategy("iso-code-anywhere", Scope::Document, r"(?i)\b(usd|eur|gbp)\b")?,
            ],
        };

        let weight = Chain {
            field: Field::Weight,
            max_len: 20,
            strategies: vec![
                strategy(
                    "weight-label",
                    Scope::Line,
                    r"(?i)weight[\s:]+([0-9,]+\.?[0-9]*)\s*(?:lbs?|kg|pounds?)?",
                )?,
                strategy("value-lbs", Scope::Line, r"(?i)([0-9,]+\.?[0-9]+)\s*lbs?\b")?,
                strategy("stacked-lbs", Scope::Document, r"(?i)(\d+)\s+lbs")?,
            ],
        };

        let carrier_name = Chain {
            field: Field::CarrierName,
            max_len: 50,
            strategies: vec![
                strategy(
                    "carrier-label",
                    Scope::Line,
                    r"(?i)carrier(?:\s+name)?[\s:]+([A-Za-z0-9 &,.\-]+?)(?:mc\s|phone|equipment|rate|details|$)",
                )?,
                strategy(
                    "carrier-freeform",
                    Scope::Line,
                    r"(?i)carrier[\s:]+([A-Za-z0-9 &,.\-]{2,50})",
                )?,
                strategy(
                    "accepted-by",
                    Scope::Document,
                    r"(?i)accepted\s+by\s+([A-Za-z]+)",
                )?,
                strategy(
                    "customer-name",
                    Scope::Document,
                    r"(?i)customer[ \t]+([A-Za-z][A-Za-z ]+)",
                )?,
            ],
        };

        Ok(Self {
            shipment_id,
            shipper,
            consignee,
            pickup_datetime,
            delivery_datetime,
            booking_datetime,
            equipment_type,
            mode,
            rate,
            currency,
            weight,
            carrier_name,
            date_shape: Regex::new(r"\d{1,2}[-/]\d{1,2}[-/]\d{2,4}").map_err(shape_error)?,
            id_shape: Regex::new(r"^[A-Za-z0-9-]+$").map_err(shape_error)?,
            amount_shape: Regex::new(r"^[0-9.]+$").map_err(shape_error)?,
            on_prefix: Regex::new(r"(?i)^on\s+").map_err(shape_error)?,
        })
    }

    /// Extracts all twelve shipment fields from `text`.
    ///
    /// Never fails: a field whose chain finds nothing acceptable is `None`,
    /// except `currency` which falls back to `"USD"`.
    pub fn extract(&self, text: &str) -> ShipmentFields {
        let booking_datetime = self.run(&self.booking_datetime, text).map(|v| {
            // "on 03/10/2024" from the bare-on fallback keeps only the date.
            self.on_prefix.replace(&v, "").trim().to_string()
        });

        let rate = self
            .run(&self.rate, text)
            .and_then(|v| self.parse_amount(&v));
        let weight = self
            .run(&self.weight, text)
            .and_then(|v| self.parse_amount(&v));

        let currency = self
            .run(&self.currency, text)
            .map(|c| c.to_uppercase())
            .unwrap_or_else(|| "USD".to_string());

        ShipmentFields {
            shipment_id: self.run(&self.shipment_id, text),
            shipper: self.run(&self.shipper, text),
            consignee: self.run(&self.consignee, text),
            pickup_datetime: self.run(&self.pickup_datetime, text),
            delivery_datetime: self.run(&self.delivery_datetime, text),
            booking_datetime,
            equipment_type: self.run(&self.equipment_type, text),
            mode: self.run(&self.mode, text),
            rate,
            currency: Some(currency),
            weight,
            carrier_name: self.run(&self.carrier_name, text),
        }
    }

    /// Runs one field chain: first accepted candidate wins.
    fn run(&self, chain: &Chain, text: &str) -> Option<String> {
        for strategy in &chain.strategies {
            let accepted = match strategy.scope {
                Scope::Line => text
                    .lines()
                    .find_map(|line| self.accept(&strategy.pattern, line, chain)),
                Scope::Document => self.accept(&strategy.pattern, text, chain),
            };
            if let Some(value) = accepted {
                debug!(
                    field = ?chain.field,
                    strategy = strategy.name,
                    value = %value,
                    "Extracted field"
                );
                return Some(value);
            }
        }
        None
    }

    /// Captures, cleans and filters one candidate from `haystack`.
    fn accept(&self, pattern: &Regex, haystack: &str, chain: &Chain) -> Option<String> {
        let caps = pattern.captures(haystack)?;
        let raw = caps.get(1).or_else(|| caps.get(0))?.as_str();
        let value = clean_value(raw, chain.max_len)?;
        if self.reject_garbage(&value, chain.field) {
            None
        } else {
            Some(value)
        }
    }

    /// Returns true when `value` looks like a section header, a sentence
    /// fragment, or otherwise not a real value for `field`.
    fn reject_garbage(&self, value: &str, field: Field) -> bool {
        if value.len() < 2 {
            return true;
        }
        let v = value.trim().to_lowercase();

        // Datetime fields: an explicit date shape always wins over the
        // fragment heuristics below.
        let looks_like_date = self.date_shape.is_match(value);
        match field {
            Field::PickupDatetime | Field::DeliveryDatetime if looks_like_date => return false,
            Field::BookingDatetime if looks_like_date => return false,
            _ => {}
        }

        if BLOCKLIST.contains(&v.as_str()) {
            return true;
        }
        if BLOCKLIST
            .iter()
            .any(|bad| bad.len() > 3 && v.len() < 50 && v.contains(bad))
        {
            return true;
        }

        match field {
            Field::Shipper | Field::Consignee | Field::CarrierName => {
                const FRAGMENTS: [&str; 6] = [
                    " during ",
                    " to follow",
                    " location ",
                    " procedures",
                    " driver ",
                    " operating ",
                ];
                if FRAGMENTS.iter().any(|f| v.contains(f)) {
                    return true;
                }
                if v.ends_with(" on-") || v.contains(" follow on") {
                    return true;
                }
                if field == Field::CarrierName
                    && matches!(
                        v.as_str(),
                        "details" | "name" | "carrier" | "mc" | "date" | "signature" | "contact"
                    )
                {
                    return true;
                }
            }
            Field::EquipmentType => {
                if ["agreed", "amount", "rate"].iter().any(|x| v.contains(x)) {
                    return true;
                }
            }
            Field::PickupDatetime | Field::DeliveryDatetime => {
                const FRAGMENTS: [&str; 6] = [
                    " from the ",
                    " location ",
                    " during ",
                    " shipper ",
                    " driver ",
                    " normal ",
                ];
                if FRAGMENTS.iter().any(|f| v.contains(f)) {
                    return true;
                }
            }
            Field::BookingDatetime => {
                if ["procedures", " driver ", " follow ", "location"]
                    .iter()
                    .any(|x| v.contains(x))
                {
                    return true;
                }
            }
            Field::ShipmentId => {
                if !self.id_shape.is_match(value) {
                    return true;
                }
                if matches!(v.as_str(), "cedures" | "procedures") {
                    return true;
                }
            }
            _ => {}
        }
        false
    }

    /// Parses a money or weight value: commas and dollar signs stripped, the
    /// remainder must be purely numeric.
    fn parse_amount(&self, value: &str) -> Option<f64> {
        let cleaned: String = value
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.')
            .collect();
        if cleaned.is_empty() || !self.amount_shape.is_match(&cleaned) {
            return None;
        }
        cleaned.parse().ok()
    }
}

fn shape_error(e: regex::Error) -> DocsenseError {
    DocsenseError::Config(format!("Invalid extraction pattern: {e}"))
}

/// Trims, truncates to `max_len` characters, and drops values too short to
/// mean anything.
fn clean_value(raw: &str, max_len: usize) -> Option<String> {
    let mut value = raw.trim().to_string();
    if value.chars().count() > max_len {
        value = value.chars().take(max_len).collect();
        value.truncate(value.trim_end().len());
    }
    if value.chars().count() < 2 {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn extractor() -> ShipmentExtractor {
        ShipmentExtractor::new().unwrap()
    }

    #[test]
    fn test_shipment_id_from_load_label() {
        let fields = extractor().extract("Load ID: LD-482913\n");
        assert_eq!(fields.shipment_id.as_deref(), Some("LD-482913"));
    }

    #[test]
    fn test_shipment_id_rejects_known_garbage() {
        // "cedures" is a line-wrap artifact of "procedures" seen in scans.
        let fields = extractor().extract("Reference: cedures\n");
        assert_eq!(fields.shipment_id, None);
    }

    #[test]
    fn test_shipper_label_stops_at_phone() {
        let fields = extractor().extract("Shipper: Acme Manufacturing Co Phone: 555-0100\n");
        assert_eq!(fields.shipper.as_deref(), Some("Acme Manufacturing Co"));
    }

    #[test]
    fn test_shipper_header_value_is_rejected() {
        // "Details" is a section header, not a company.
        let fields = extractor().extract("Shipper: Details\n");
        assert_eq!(fields.shipper, None);
    }

    #[test]
    fn test_pickup_date_with_time_and_meridiem() {
        let fields = extractor().extract("Pickup Date: 03/15/2024 08:00 am\n");
        assert_eq!(
            fields.pickup_datetime.as_deref(),
            Some("03/15/2024 08:00 am")
        );
    }

    #[test]
    fn test_pickup_fragment_is_rejected() {
        let fields = extractor().extract("Pickup: at the shipper location during hours\n");
        assert_eq!(fields.pickup_datetime, None);
    }

    #[test]
    fn test_booking_from_bare_on_date_strips_prefix() {
        let fields = extractor().extract("Booked on 03/10/2024\n");
        assert_eq!(fields.booking_datetime.as_deref(), Some("03/10/2024"));
    }

    #[test]
    fn test_rate_strips_dollar_and_commas() {
        let fields = extractor().extract("Rate: $2,450.00\n");
        assert_eq!(fields.rate, Some(2450.0));
    }

    #[test]
    fn test_weight_with_unit() {
        let fields = extractor().extract("Weight: 42,000 lbs\n");
        assert_eq!(fields.weight, Some(42000.0));
    }

    #[test]
    fn test_currency_defaults_to_usd() {
        let fields = extractor().extract("Rate: $500\n");
        assert_eq!(fields.currency.as_deref(), Some("USD"));
    }

    #[test]
    fn test_currency_code_is_uppercased() {
        let fields = extractor().extract("Total: 1800 eur\n");
        assert_eq!(fields.currency.as_deref(), Some("EUR"));
    }

    #[test]
    fn test_equipment_rejects_agreed_amount() {
        let fields = extractor().extract("Equipment: Agreed Amount\nEquipment Type: Reefer\n");
        assert_eq!(fields.equipment_type.as_deref(), Some("Reefer"));
    }

    #[test]
    fn test_mode_label() {
        let fields = extractor().extract("Mode: FTL\n");
        assert_eq!(fields.mode.as_deref(), Some("FTL"));
    }

    #[test]
    fn test_stacked_load_type_fallback() {
        let fields = extractor().extract("Load Type\nLTL\n");
        assert_eq!(fields.mode.as_deref(), Some("LTL"));
    }

    #[test]
    fn test_carrier_label_stops_before_mc_number() {
        let fields = extractor().extract("Carrier: Swift Logistics LLC MC 123456\n");
        assert_eq!(fields.carrier_name.as_deref(), Some("Swift Logistics LLC"));
    }

    #[test]
    fn test_empty_document_yields_nulls_and_default_currency() {
        let fields = extractor().extract("");
        assert_eq!(fields.shipment_id, None);
        assert_eq!(fields.rate, None);
        assert_eq!(fields.weight, None);
        assert_eq!(fields.currency.as_deref(), Some("USD"));
    }
}
