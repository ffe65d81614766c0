use crate::error::{Error, Result};

pub const DEFAULT_COLOR: &str = "#ffffff";

/// How wire colors appear in label text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    Short,
    Full,
    Hex,
}

/// Maps a two-letter color code to its hex value.
fn color_hex(code: &str) -> Option<&'static str> {
    Some(match code {
        "BK" => "#000000",
        "WH" => "#ffffff",
        "GY" => "#999999",
        "PK" => "#ff66cc",
        "RD" => "#ff0000",
        "OG" => "#ff8000",
        "YE" => "#ffff00",
        "OL" => "#708000",
        "GN" => "#00ff00",
        "TQ" => "#00ffff",
        "LB" => "#a0dfff",
        "BU" => "#0066ff",
        "VT" => "#8000ff",
        "BN" => "#895956",
        "BG" => "#ceb673",
        "IV" => "#f5f0d0",
        "SL" => "#708090",
        "CU" => "#d6775e",
        "SN" => "#aaaaaa",
        "SR" => "#84878c",
        "GD" => "#ffcf80",
        _ => return None,
    })
}

fn color_full(code: &str) -> Option<&'static str> {
    Some(match code {
        "BK" => "black",
        "WH" => "white",
        "GY" => "grey",
        "PK" => "pink",
        "RD" => "red",
        "OG" => "orange",
        "YE" => "yellow",
        "OL" => "olive green",
        "GN" => "green",
        "TQ" => "turquoise",
        "LB" => "light blue",
        "BU" => "blue",
        "VT" => "violet",
        "BN" => "brown",
        "BG" => "beige",
        "IV" => "ivory",
        "SL" => "slate",
        "CU" => "copper",
        "SN" => "tin",
        "SR" => "silver",
        "GD" => "gold",
        _ => return None,
    })
}

/// Expands a color string into the hex values of its bands.
///
/// A 4-letter string is a two-color wire and gets the A-B-A striped look.
/// With `pad`, single colors triple up so every wire in a harness with
/// multi-color wires renders at the same thickness.
pub fn get_color_hex(color: &str, pad: bool) -> Result<Vec<String>> {
    if color.is_empty() {
        return Ok(vec![DEFAULT_COLOR.to_string()]);
    }
    let mut codes = color.to_string();
    if codes.len() == 4 {
        let first = codes[..2].to_string();
        codes.push_str(&first);
    } else if pad && codes.len() == 2 {
        codes = codes.repeat(3);
    }
    if codes.len() % 2 != 0 {
        return Err(Error::FormatError(format!("invalid color string '{color}'")));
    }
    let mut output = Vec::with_capacity(codes.len() / 2);
    for index in (0..codes.len()).step_by(2) {
        let code = &codes[index..index + 2];
        let hex = color_hex(code)
            .ok_or_else(|| Error::FormatError(format!("unknown color code '{code}'")))?;
        output.push(hex.to_string());
    }
    Ok(output)
}

/// Translates a color string for display in label text.
pub fn translate_color(color: &str, mode: ColorMode) -> Result<String> {
    if color.is_empty() {
        return Ok(String::new());
    }
    match mode {
        ColorMode::Short => Ok(color.to_string()),
        ColorMode::Hex => Ok(get_color_hex(color, false)?.join(":")),
        ColorMode::Full => {
            if color.len() % 2 != 0 {
                return Err(Error::FormatError(format!("invalid color string '{color}'")));
            }
            let mut names = Vec::with_capacity(color.len() / 2);
            for index in (0..color.len()).step_by(2) {
                let code = &color[index..index + 2];
                let name = color_full(code)
                    .ok_or_else(|| Error::FormatError(format!("unknown color code '{code}'")))?;
                names.push(name);
            }
            Ok(names.join("/"))
        }
    }
}
