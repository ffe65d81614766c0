use regex::Regex;
use rust_decimal::Decimal;
use std::sync::OnceLock;

/// Collapses line breaks and runs of whitespace into single spaces.
pub fn clean_whitespace(input: &str) -> String {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    let re = WHITESPACE.get_or_init(|| Regex::new(r"\s+").expect("static pattern"));
    re.replace_all(input.trim(), " ").into_owned()
}

/// AWG equivalent of a mm² wire gauge.
pub fn awg_equiv(gauge: &str) -> Option<&'static str> {
    Some(match gauge {
        "0.09" => "28",
        "0.14" => "26",
        "0.25" => "24",
        "0.34" => "22",
        "0.5" => "21",
        "0.75" => "20",
        "1" => "18",
        "1.5" => "16",
        "2.5" => "14",
        "4" => "12",
        "6" => "10",
        "10" => "8",
        "16" => "6",
        "25" => "4",
        "35" => "2",
        "50" => "1",
        _ => return None,
    })
}

/// mm² equivalent of an AWG wire gauge.
pub fn mm2_equiv(gauge: &str) -> Option<&'static str> {
    Some(match gauge {
        "28" => "0.09",
        "26" => "0.14",
        "24" => "0.25",
        "22" => "0.34",
        "21" => "0.5",
        "20" => "0.75",
        "18" => "1",
        "16" => "1.5",
        "14" => "2.5",
        "12" => "4",
        "10" => "6",
        "8" => "10",
        "6" => "16",
        "4" => "25",
        "2" => "35",
        "1" => "50",
        _ => return None,
    })
}

/// Combined manufacturer/MPN label field; a lone MPN gets the `MFR` placeholder.
pub fn manufacturer_info_field(manufacturer: Option<&str>, mpn: Option<&str>) -> Option<String> {
    if manufacturer.is_none() && mpn.is_none() {
        return None;
    }
    let mut output = manufacturer.unwrap_or("MFR").to_string();
    if let Some(mpn) = mpn {
        output.push(' ');
        output.push_str(mpn);
    }
    Some(output)
}

/// One additional-component label line: `<qty>[ <unit>] x <name>`, with an
/// optional second line carrying part and manufacturer information.
pub fn component_table_entry(
    name: &str,
    qty: Decimal,
    unit: Option<&str>,
    pn: Option<&str>,
    manufacturer: Option<&str>,
    mpn: Option<&str>,
) -> String {
    let mut output = qty.to_string();
    if let Some(unit) = unit {
        output.push(' ');
        output.push_str(unit);
    }
    output.push_str(" x ");
    output.push_str(name);
    let manufacturer_str = manufacturer_info_field(manufacturer, mpn);
    if pn.is_some() || manufacturer_str.is_some() {
        output.push('\n');
        if let Some(pn) = pn {
            output.push_str("P/N: ");
            output.push_str(pn);
        }
        if pn.is_some() && manufacturer_str.is_some() {
            output.push_str(", ");
        }
        if let Some(info) = manufacturer_str {
            output.push_str(&info);
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn whitespace_collapses_to_single_spaces() {
        assert_eq!(clean_whitespace("  a\n b\t\tc "), "a b c");
    }

    #[test]
    fn gauge_equivalents_round_trip() {
        assert_eq!(awg_equiv("0.25"), Some("24"));
        assert_eq!(mm2_equiv("24"), Some("0.25"));
        assert_eq!(awg_equiv("0.33"), None);
    }

    #[test]
    fn manufacturer_field_variants() {
        assert_eq!(manufacturer_info_field(None, None), None);
        assert_eq!(
            manufacturer_info_field(Some("Molex"), None).as_deref(),
            Some("Molex")
        );
        assert_eq!(
            manufacturer_info_field(None, Some("12345")).as_deref(),
            Some("MFR 12345")
        );
        assert_eq!(
            manufacturer_info_field(Some("Molex"), Some("12345")).as_deref(),
            Some("Molex 12345")
        );
    }

    #[test]
    fn component_entry_formats_quantity_and_parts() {
        assert_eq!(
            component_table_entry("Crimp", dec!(4), None, None, None, None),
            "4 x Crimp"
        );
        assert_eq!(
            component_table_entry("Wire seal", dec!(0.5), Some("m"), Some("WS-1"), None, None),
            "0.5 m x Wire seal\nP/N: WS-1"
        );
    }
}
