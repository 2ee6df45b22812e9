use ratatui::style::Color;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    pub ui: UiColors,
    pub syntax: SyntaxColors,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiColors {
    pub background: ThemeColor,
    pub foreground: ThemeColor,
    pub border: ThemeColor,
    pub border_focused: ThemeColor,
    pub title: ThemeColor,
    pub title_focused: ThemeColor,
    pub selection: ThemeColor,
    pub search_match: ThemeColor,

    // Status bar
    pub status_bar_bg: ThemeColor,
    pub status_bar_fg: ThemeColor,
    pub mode_reading_bg: ThemeColor,
    pub mode_reading_fg: ThemeColor,
    pub mode_search_bg: ThemeColor,
    pub mode_search_fg: ThemeColor,
    pub mode_toc_bg: ThemeColor,
    pub mode_toc_fg: ThemeColor,

    // Prose
    pub heading: ThemeColor,
    pub emphasis: ThemeColor,
    pub inline_code: ThemeColor,
    pub link: ThemeColor,
    pub quote: ThemeColor,

    // Callout boxes
    pub callout_exercise: ThemeColor,
    pub callout_example: ThemeColor,
    pub callout_tip: ThemeColor,
    pub callout_warning: ThemeColor,

    // Contents sidebar
    pub toc_entry: ThemeColor,
    pub toc_current: ThemeColor,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyntaxColors {
    pub mnemonic: ThemeColor,  // mov, push, call, jmp, ...
    pub register: ThemeColor,  // eax, ebx, esi, ebp, ...
    pub directive: ThemeColor, // db, dd, org, format, section
    pub number: ThemeColor,    // hex, decimal, binary
    pub string: ThemeColor,    // "quoted strings"
    pub comment: ThemeColor,   // ; comments
    pub label: ThemeColor,     // labels:
    pub operator: ThemeColor,  // +, -, [, ], plain text
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ThemeColor {
    Rgb { r: u8, g: u8, b: u8 },
    Named(String),
}

impl ThemeColor {
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::Rgb { r, g, b }
    }

    pub fn to_color(&self) -> Color {
        match self {
            ThemeColor::Rgb { r, g, b } => Color::Rgb(*r, *g, *b),
            ThemeColor::Named(name) => match name.to_lowercase().as_str() {
                "black" => Color::Black,
                "red" => Color::Red,
                "green" => Color::Green,
                "yellow" => Color::Yellow,
                "blue" => Color::Blue,
                "magenta" => Color::Magenta,
                "cyan" => Color::Cyan,
                "white" => Color::White,
                "gray" | "grey" => Color::Gray,
                "darkgray" | "darkgrey" => Color::DarkGray,
                "lightred" => Color::LightRed,
                "lightgreen" => Color::LightGreen,
                "lightyellow" => Color::LightYellow,
                "lightblue" => Color::LightBlue,
                "lightmagenta" => Color::LightMagenta,
                "lightcyan" => Color::LightCyan,
                _ => {
                    // Try parsing hex color #RRGGBB
                    if name.starts_with('#') && name.len() == 7 {
                        if let (Ok(r), Ok(g), Ok(b)) = (
                            u8::from_str_radix(&name[1..3], 16),
                            u8::from_str_radix(&name[3..5], 16),
                            u8::from_str_radix(&name[5..7], 16),
                        ) {
                            return Color::Rgb(r, g, b);
                        }
                    }
                    Color::White
                }
            },
        }
    }
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            name: String::from("dark"),
            ui: UiColors {
                background: ThemeColor::rgb(30, 30, 30),
                foreground: ThemeColor::rgb(212, 212, 212),
                border: ThemeColor::rgb(60, 60, 60),
                border_focused: ThemeColor::rgb(100, 149, 237),
                title: ThemeColor::rgb(100, 100, 100),
                title_focused: ThemeColor::rgb(100, 149, 237),
                selection: ThemeColor::rgb(70, 70, 120),
                search_match: ThemeColor::rgb(100, 80, 0),

                status_bar_bg: ThemeColor::rgb(25, 25, 25),
                status_bar_fg: ThemeColor::rgb(150, 150, 150),
                mode_reading_bg: ThemeColor::rgb(86, 156, 214),
                mode_reading_fg: ThemeColor::rgb(30, 30, 30),
                mode_search_bg: ThemeColor::rgb(214, 157, 86),
                mode_search_fg: ThemeColor::rgb(30, 30, 30),
                mode_toc_bg: ThemeColor::rgb(180, 130, 200),
                mode_toc_fg: ThemeColor::rgb(30, 30, 30),

                heading: ThemeColor::rgb(86, 156, 214),
                emphasis: ThemeColor::rgb(220, 220, 170),
                inline_code: ThemeColor::rgb(206, 145, 120),
                link: ThemeColor::rgb(78, 201, 176),
                quote: ThemeColor::rgb(128, 128, 128),

                callout_exercise: ThemeColor::rgb(180, 130, 200),
                callout_example: ThemeColor::rgb(86, 156, 214),
                callout_tip: ThemeColor::rgb(78, 201, 176),
                callout_warning: ThemeColor::rgb(229, 192, 123),

                toc_entry: ThemeColor::rgb(180, 180, 180),
                toc_current: ThemeColor::rgb(220, 220, 170),
            },
            syntax: SyntaxColors {
                mnemonic: ThemeColor::rgb(86, 156, 214),   // Blue
                register: ThemeColor::rgb(156, 220, 254),  // Light blue
                directive: ThemeColor::rgb(197, 134, 192), // Purple
                number: ThemeColor::rgb(181, 206, 168),    // Light green
                string: ThemeColor::rgb(206, 145, 120),    // Orange/brown
                comment: ThemeColor::rgb(106, 153, 85),    // Green
                label: ThemeColor::rgb(220, 220, 170),     // Yellow
                operator: ThemeColor::rgb(212, 212, 212),  // White
            },
        }
    }

    pub fn light() -> Self {
        Self {
            name: String::from("light"),
            ui: UiColors {
                background: ThemeColor::rgb(255, 255, 255),
                foreground: ThemeColor::rgb(30, 30, 30),
                border: ThemeColor::rgb(200, 200, 200),
                border_focused: ThemeColor::rgb(0, 122, 204),
                title: ThemeColor::rgb(120, 120, 120),
                title_focused: ThemeColor::rgb(0, 122, 204),
                selection: ThemeColor::rgb(173, 214, 255),
                search_match: ThemeColor::rgb(255, 235, 150),

                status_bar_bg: ThemeColor::rgb(240, 240, 240),
                status_bar_fg: ThemeColor::rgb(80, 80, 80),
                mode_reading_bg: ThemeColor::rgb(0, 122, 204),
                mode_reading_fg: ThemeColor::rgb(255, 255, 255),
                mode_search_bg: ThemeColor::rgb(234, 88, 12),
                mode_search_fg: ThemeColor::rgb(255, 255, 255),
                mode_toc_bg: ThemeColor::rgb(147, 51, 234),
                mode_toc_fg: ThemeColor::rgb(255, 255, 255),

                heading: ThemeColor::rgb(0, 122, 204),
                emphasis: ThemeColor::rgb(180, 140, 0),
                inline_code: ThemeColor::rgb(163, 21, 21),
                link: ThemeColor::rgb(22, 163, 74),
                quote: ThemeColor::rgb(120, 120, 120),

                callout_exercise: ThemeColor::rgb(147, 51, 234),
                callout_example: ThemeColor::rgb(0, 122, 204),
                callout_tip: ThemeColor::rgb(22, 163, 74),
                callout_warning: ThemeColor::rgb(180, 140, 0),

                toc_entry: ThemeColor::rgb(60, 60, 60),
                toc_current: ThemeColor::rgb(0, 122, 204),
            },
            syntax: SyntaxColors {
                mnemonic: ThemeColor::rgb(0, 0, 255),    // Blue
                register: ThemeColor::rgb(0, 128, 128),  // Teal
                directive: ThemeColor::rgb(175, 0, 219), // Purple
                number: ThemeColor::rgb(9, 134, 88),     // Green
                string: ThemeColor::rgb(163, 21, 21),    // Red/brown
                comment: ThemeColor::rgb(0, 128, 0),     // Green
                label: ThemeColor::rgb(121, 94, 38),     // Brown
                operator: ThemeColor::rgb(30, 30, 30),   // Black
            },
        }
    }

    pub fn gruvbox() -> Self {
        Self {
            name: String::from("gruvbox"),
            ui: UiColors {
                background: ThemeColor::rgb(40, 40, 40),
                foreground: ThemeColor::rgb(235, 219, 178),
                border: ThemeColor::rgb(80, 73, 69),
                border_focused: ThemeColor::rgb(215, 153, 33),
                title: ThemeColor::rgb(146, 131, 116),
                title_focused: ThemeColor::rgb(215, 153, 33),
                selection: ThemeColor::rgb(80, 73, 69),
                search_match: ThemeColor::rgb(215, 153, 33),

                status_bar_bg: ThemeColor::rgb(50, 48, 47),
                status_bar_fg: ThemeColor::rgb(168, 153, 132),
                mode_reading_bg: ThemeColor::rgb(131, 165, 152),
                mode_reading_fg: ThemeColor::rgb(40, 40, 40),
                mode_search_bg: ThemeColor::rgb(254, 128, 25),
                mode_search_fg: ThemeColor::rgb(40, 40, 40),
                mode_toc_bg: ThemeColor::rgb(211, 134, 155),
                mode_toc_fg: ThemeColor::rgb(40, 40, 40),

                heading: ThemeColor::rgb(250, 189, 47),
                emphasis: ThemeColor::rgb(254, 128, 25),
                inline_code: ThemeColor::rgb(184, 187, 38),
                link: ThemeColor::rgb(131, 165, 152),
                quote: ThemeColor::rgb(146, 131, 116),

                callout_exercise: ThemeColor::rgb(211, 134, 155),
                callout_example: ThemeColor::rgb(131, 165, 152),
                callout_tip: ThemeColor::rgb(184, 187, 38),
                callout_warning: ThemeColor::rgb(250, 189, 47),

                toc_entry: ThemeColor::rgb(235, 219, 178),
                toc_current: ThemeColor::rgb(250, 189, 47),
            },
            syntax: SyntaxColors {
                mnemonic: ThemeColor::rgb(251, 73, 52),    // Red
                register: ThemeColor::rgb(131, 165, 152),  // Aqua
                directive: ThemeColor::rgb(211, 134, 155), // Purple
                number: ThemeColor::rgb(211, 134, 155),    // Purple
                string: ThemeColor::rgb(184, 187, 38),     // Green
                comment: ThemeColor::rgb(146, 131, 116),   // Gray
                label: ThemeColor::rgb(250, 189, 47),      // Yellow
                operator: ThemeColor::rgb(235, 219, 178),  // Fg
            },
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "light" => Self::light(),
            "gruvbox" => Self::gruvbox(),
            _ => Self::dark(),
        }
    }

    pub fn available_themes() -> Vec<&'static str> {
        vec!["dark", "light", "gruvbox"]
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}
