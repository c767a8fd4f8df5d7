//! Colour notation handling for SLD fill/stroke parameters.
//!
//! Every colour leaving the translator is upper-case `#RRGGBB`.

/// Used when a rule carries no usable colour.
pub const DEFAULT_FILL: &str = "#808080";

const NAMED_COLORS: &[(&str, &str)] = &[
    ("black", "#000000"),
    ("white", "#FFFFFF"),
    ("red", "#FF0000"),
    ("green", "#008000"),
    ("blue", "#0000FF"),
    ("yellow", "#FFFF00"),
    ("cyan", "#00FFFF"),
    ("magenta", "#FF00FF"),
    ("gray", "#808080"),
    ("grey", "#808080"),
    ("orange", "#FFA500"),
    ("purple", "#800080"),
    ("brown", "#A52A2A"),
    ("pink", "#FFC0CB"),
    ("lime", "#00FF00"),
    ("navy", "#000080"),
    ("teal", "#008080"),
    ("silver", "#C0C0C0"),
    ("maroon", "#800000"),
    ("olive", "#808000"),
];

pub fn rgb_to_hex(r: u8, g: u8, b: u8) -> String {
    format!("#{:02X}{:02X}{:02X}", r, g, b)
}

/// Decode `#RGB`, `#RRGGBB` or `#RRGGBBAA` (alpha ignored).
pub fn hex_to_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.strip_prefix('#')?;
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    match digits.len() {
        3 | 4 => {
            let mut channels = digits.chars().map(|c| {
                let v = c.to_digit(16).unwrap_or(0) as u8;
                v * 17
            });
            Some((channels.next()?, channels.next()?, channels.next()?))
        }
        6 | 8 => {
            let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
            Some((channel(0)?, channel(2)?, channel(4)?))
        }
        _ => None,
    }
}

/// Normalise any supported notation to `#RRGGBB`.
///
/// Returns `None` for text that is not a colour; the caller decides the fallback.
pub fn normalize_color(raw: &str) -> Option<String> {
    let color = raw.trim();
    if color.is_empty() {
        return None;
    }

    if color.starts_with('#') {
        return hex_to_rgb(color).map(|(r, g, b)| rgb_to_hex(r, g, b));
    }

    let lower = color.to_ascii_lowercase();

    if let Some(args) = function_args(&lower, &["rgba", "rgb"]) {
        return parse_rgb_args(&args).map(|(r, g, b)| rgb_to_hex(r, g, b));
    }

    if let Some(args) = function_args(&lower, &["hsla", "hsl"]) {
        return parse_hsl_args(&args).map(|(r, g, b)| rgb_to_hex(r, g, b));
    }

    if let Some((_, hex)) = NAMED_COLORS.iter().find(|(name, _)| *name == lower) {
        return Some((*hex).to_string());
    }

    // bare "r,g,b"
    if lower.contains(',') {
        let parts: Vec<&str> = lower.split(',').map(str::trim).collect();
        if parts.len() == 3 {
            let channels: Option<Vec<u8>> = parts
                .iter()
                .map(|p| p.parse::<f64>().ok().map(clamp_channel))
                .collect();
            if let Some(c) = channels {
                return Some(rgb_to_hex(c[0], c[1], c[2]));
            }
        }
    }

    None
}

fn function_args(color: &str, names: &[&str]) -> Option<Vec<String>> {
    for name in names {
        if let Some(rest) = color.strip_prefix(name) {
            let inner = rest.trim_start().strip_prefix('(')?.strip_suffix(')')?;
            return Some(inner.split(',').map(|s| s.trim().to_string()).collect());
        }
    }
    None
}

fn clamp_channel(v: f64) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

fn parse_rgb_args(args: &[String]) -> Option<(u8, u8, u8)> {
    if args.len() != 3 && args.len() != 4 {
        return None;
    }

    let channel = |s: &str| -> Option<u8> {
        match s.strip_suffix('%') {
            Some(pct) => {
                let pct: f64 = pct.trim().parse().ok()?;
                Some(clamp_channel(pct.clamp(0.0, 100.0) / 100.0 * 255.0))
            }
            None => s.parse::<f64>().ok().map(clamp_channel),
        }
    };

    Some((channel(&args[0])?, channel(&args[1])?, channel(&args[2])?))
}

fn parse_hsl_args(args: &[String]) -> Option<(u8, u8, u8)> {
    if args.len() != 3 && args.len() != 4 {
        return None;
    }

    let h: f64 = args[0].trim_end_matches("deg").parse().ok()?;
    let s: f64 = args[1].strip_suffix('%')?.trim().parse().ok()?;
    let l: f64 = args[2].strip_suffix('%')?.trim().parse().ok()?;

    Some(hsl_to_rgb(h, s / 100.0, l / 100.0))
}

/// `h` in degrees, `s` and `l` in `[0, 1]`.
pub fn hsl_to_rgb(h: f64, s: f64, l: f64) -> (u8, u8, u8) {
    let h = (h.rem_euclid(360.0)) / 360.0;
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);

    if s == 0.0 {
        let v = clamp_channel(l * 255.0);
        return (v, v, v);
    }

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;

    let hue_to_rgb = |mut t: f64| {
        if t < 0.0 {
            t += 1.0;
        }
        if t > 1.0 {
            t -= 1.0;
        }
        if t < 1.0 / 6.0 {
            p + (q - p) * 6.0 * t
        } else if t < 0.5 {
            q
        } else if t < 2.0 / 3.0 {
            p + (q - p) * (2.0 / 3.0 - t) * 6.0
        } else {
            p
        }
    };

    (
        clamp_channel(hue_to_rgb(h + 1.0 / 3.0) * 255.0),
        clamp_channel(hue_to_rgb(h) * 255.0),
        clamp_channel(hue_to_rgb(h - 1.0 / 3.0) * 255.0),
    )
}
