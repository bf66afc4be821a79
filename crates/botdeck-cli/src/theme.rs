//! Terminal styling. Color capability is probed once in `main` and the
//! resulting [`Theme`] is handed to every renderer.

use is_terminal::IsTerminal;
use owo_colors::OwoColorize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Accent,
    Text,
    Good,
    Bad,
    Notice,
    Heading,
    Muted,
}

impl Role {
    fn rgb(self) -> (u8, u8, u8) {
        match self {
            Role::Accent => (190, 160, 255),
            Role::Text => (235, 225, 210),
            Role::Good => (170, 230, 185),
            Role::Bad => (255, 150, 150),
            Role::Notice => (245, 215, 140),
            Role::Heading => (170, 235, 235),
            Role::Muted => (170, 170, 170),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorDepth {
    None,
    Basic,
    TrueColor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub depth: ColorDepth,
}

const GRADIENT_FROM: (u8, u8, u8) = (190, 160, 255);
const GRADIENT_TO: (u8, u8, u8) = (245, 215, 160);

impl Theme {
    pub fn plain() -> Self {
        Self {
            depth: ColorDepth::None,
        }
    }

    pub fn detect() -> Self {
        let tty = std::io::stdout().is_terminal();
        let colorterm = std::env::var("COLORTERM").unwrap_or_default();
        let term = std::env::var("TERM").unwrap_or_default();
        Self {
            depth: depth_for(tty, &colorterm, &term),
        }
    }

    pub fn paint(&self, text: impl AsRef<str>, role: Role) -> String {
        let text = text.as_ref();
        match self.depth {
            ColorDepth::None => text.to_string(),
            ColorDepth::TrueColor => {
                let (r, g, b) = role.rgb();
                text.truecolor(r, g, b).to_string()
            }
            ColorDepth::Basic => match role {
                Role::Accent => text.magenta().to_string(),
                Role::Text => text.white().to_string(),
                Role::Good => text.green().to_string(),
                Role::Bad => text.red().to_string(),
                Role::Notice => text.yellow().to_string(),
                Role::Heading => text.cyan().to_string(),
                Role::Muted => text.dimmed().to_string(),
            },
        }
    }

    pub fn bold(&self, text: impl AsRef<str>) -> String {
        match self.depth {
            ColorDepth::None => text.as_ref().to_string(),
            _ => text.as_ref().bold().to_string(),
        }
    }

    /// Per-character color ramp; plain text unless the terminal has 24-bit color.
    pub fn gradient(&self, text: &str) -> String {
        if self.depth != ColorDepth::TrueColor {
            return text.to_string();
        }
        let chars: Vec<char> = text.chars().collect();
        let last = chars.len().saturating_sub(1).max(1) as f32;
        chars
            .iter()
            .enumerate()
            .map(|(i, ch)| {
                let t = i as f32 / last;
                let (r, g, b) = lerp(GRADIENT_FROM, GRADIENT_TO, t);
                ch.truecolor(r, g, b).to_string()
            })
            .collect()
    }

    pub fn separator(&self, width: usize) -> String {
        self.gradient(&"─".repeat(width))
    }
}

fn depth_for(tty: bool, colorterm: &str, term: &str) -> ColorDepth {
    if !tty {
        return ColorDepth::None;
    }
    let colorterm = colorterm.to_lowercase();
    let term = term.to_lowercase();
    if colorterm.contains("truecolor")
        || colorterm.contains("24bit")
        || term.contains("xterm-kitty")
        || term.contains("tmux-truecolor")
    {
        ColorDepth::TrueColor
    } else {
        ColorDepth::Basic
    }
}

fn lerp(from: (u8, u8, u8), to: (u8, u8, u8), t: f32) -> (u8, u8, u8) {
    let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t) as u8;
    (mix(from.0, to.0), mix(from.1, to.1), mix(from.2, to.2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipes_get_no_color() {
        assert_eq!(depth_for(false, "truecolor", "xterm-kitty"), ColorDepth::None);
    }

    #[test]
    fn truecolor_from_colorterm_or_term() {
        assert_eq!(depth_for(true, "24bit", "xterm"), ColorDepth::TrueColor);
        assert_eq!(depth_for(true, "", "xterm-kitty"), ColorDepth::TrueColor);
        assert_eq!(depth_for(true, "", "xterm-256color"), ColorDepth::Basic);
    }

    #[test]
    fn plain_theme_leaves_text_alone() {
        let theme = Theme::plain();
        assert_eq!(theme.paint("ok", Role::Good), "ok");
        assert_eq!(theme.gradient("title"), "title");
        assert_eq!(theme.separator(3), "───");
    }

    #[test]
    fn gradient_spans_both_ends() {
        let theme = Theme {
            depth: ColorDepth::TrueColor,
        };
        let out = theme.gradient("ab");
        assert!(out.contains("38;2;190;160;255"));
        assert!(out.contains("38;2;245;215;160"));
    }
}
