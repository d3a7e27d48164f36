use colored::Colorize;

/// 交互终端下的提示符样式，非终端输入时不使用
pub struct Theme {
    pub prompt_style: Box<dyn Fn(&str) -> String>,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            prompt_style: Box::new(|s| s.bright_cyan().to_string()),
        }
    }
}

impl Theme {
    pub fn load_theme(theme_name: &str) -> Theme {
        match theme_name {
            "dark" => Theme {
                prompt_style: Box::new(|s| s.bright_purple().to_string()),
            },
            "plain" => Theme {
                prompt_style: Box::new(|s| s.to_string()),
            },
            _ => Theme::default(),
        }
    }
}
