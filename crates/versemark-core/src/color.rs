//! CSS color strings as stored on strokes.

use peniko::Color;

/// Parse a CSS color: `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`, `rgb()`,
/// `rgba()`, `transparent` or a handful of common names.
pub fn parse_color(color: &str) -> Option<Color> {
    let color = color.trim();
    if color.eq_ignore_ascii_case("transparent") {
        return Some(Color::from_rgba8(0, 0, 0, 0));
    }
    if let Some(hex) = color.strip_prefix('#') {
        return parse_hex(hex.trim());
    }
    if let Some(args) = function_args(color, "rgba").or_else(|| function_args(color, "rgb")) {
        return parse_rgb_args(args);
    }
    named(color)
}

/// Parse a color, falling back to black.
pub fn color_or_black(color: &str) -> Color {
    parse_color(color).unwrap_or_else(|| {
        log::warn!("Unrecognized color {:?}, using black", color);
        Color::from_rgba8(0, 0, 0, 255)
    })
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.is_ascii() {
        return None;
    }
    let short = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);
    let long = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();

    match hex.len() {
        3 => Some(Color::from_rgba8(short(0)?, short(1)?, short(2)?, 255)),
        4 => Some(Color::from_rgba8(short(0)?, short(1)?, short(2)?, short(3)?)),
        6 => Some(Color::from_rgba8(long(0)?, long(2)?, long(4)?, 255)),
        8 => Some(Color::from_rgba8(long(0)?, long(2)?, long(4)?, long(6)?)),
        _ => None,
    }
}

fn function_args<'a>(color: &'a str, name: &str) -> Option<&'a str> {
    let rest = color.get(..name.len())?;
    if !rest.eq_ignore_ascii_case(name) {
        return None;
    }
    color[name.len()..]
        .trim_start()
        .strip_prefix('(')?
        .strip_suffix(')')
}

fn parse_rgb_args(args: &str) -> Option<Color> {
    let parts: Vec<&str> = args
        .split([',', ' ', '/'])
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }

    let channel = |s: &str| -> Option<u8> {
        let value = match s.strip_suffix('%') {
            Some(pct) => pct.parse::<f64>().ok()? * 2.55,
            None => s.parse::<f64>().ok()?,
        };
        Some(value.round().clamp(0.0, 255.0) as u8)
    };
    let alpha = match parts.get(3) {
        Some(s) => {
            let value = match s.strip_suffix('%') {
                Some(pct) => pct.parse::<f64>().ok()? / 100.0,
                None => s.parse::<f64>().ok()?,
            };
            (value.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        None => 255,
    };
    Some(Color::from_rgba8(
        channel(parts[0])?,
        channel(parts[1])?,
        channel(parts[2])?,
        alpha,
    ))
}

fn named(color: &str) -> Option<Color> {
    let rgb = match color.to_ascii_lowercase().as_str() {
        "black" => (0, 0, 0),
        "white" => (255, 255, 255),
        "red" => (255, 0, 0),
        "green" => (0, 128, 0),
        "lime" => (0, 255, 0),
        "blue" => (0, 0, 255),
        "yellow" => (255, 255, 0),
        "orange" => (255, 165, 0),
        "purple" => (128, 0, 128),
        "pink" => (255, 192, 203),
        "cyan" | "aqua" => (0, 255, 255),
        "magenta" | "fuchsia" => (255, 0, 255),
        "gray" | "grey" => (128, 128, 128),
        _ => return None,
    };
    Some(Color::from_rgba8(rgb.0, rgb.1, rgb.2, 255))
}
