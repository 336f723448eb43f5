//! Style roles for terminal output
//!
//! Each logical role maps to an optional `colored::Color`. Painting only
//! happens when the caller says color is enabled, so there is no global state.
//!
//! ```
//! use eventqueue::core::styles::StyleRole;
//! assert_eq!(StyleRole::Title.paint("Summary", false), "Summary");
//! assert!(StyleRole::Title.paint("Summary", true).starts_with("\x1b["));
//! ```

use colored::Color;

macro_rules! style {
    ( $( $variant:ident => $color:expr ),+ $(,)? ) => {
        #[derive(Copy, Clone, Debug, PartialEq, Eq)]
        pub enum StyleRole { $( $variant ),+ }

        impl StyleRole {
            pub fn color(self) -> Option<Color> {
                match self { $( StyleRole::$variant => $color ),+ }
            }
        }
    }
}

style! {
    Title     => Some(Color::Yellow),
    Metric    => Some(Color::BrightGreen),
    Value     => None,
    Healthy   => Some(Color::Green),
    Pressured => Some(Color::BrightRed),
    Accent    => Some(Color::Cyan),
    Dim       => Some(Color::BrightBlack),
}

impl StyleRole {
    pub fn ansi_code(self) -> Option<&'static str> {
        ansi_code(self.color()?)
    }

    pub fn paint(self, text: &str, enabled: bool) -> String {
        match self.ansi_code() {
            Some(code) if enabled => format!("\x1b[{}m{}\x1b[0m", code, text),
            _ => text.to_string(),
        }
    }

    /// prettytable `style_spec` foreground for this role, if it has a color
    pub fn table_spec(self, enabled: bool) -> String {
        if !enabled {
            return String::new();
        }
        let spec = match self.color() {
            Some(Color::Red) => "Fr",
            Some(Color::Green) => "Fg",
            Some(Color::Yellow) => "Fy",
            Some(Color::Cyan) => "Fc",
            Some(Color::BrightBlack) => "FK",
            Some(Color::BrightRed) => "FR",
            Some(Color::BrightGreen) => "FG",
            _ => "",
        };
        spec.to_string()
    }
}

fn ansi_code(color: Color) -> Option<&'static str> {
    use Color::*;
    Some(match color {
        Red => "31",
        Green => "32",
        Yellow => "33",
        Cyan => "36",
        BrightBlack => "90",
        BrightRed => "91",
        BrightGreen => "92",
        _ => return None,
    })
}
