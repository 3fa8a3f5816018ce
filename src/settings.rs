//! 設定値
//!
//! `:set` と設定ファイルから名前で変更される値を型付きで保持する。

use crate::error::ConfigError;
use crate::input::ArgKind;

/// 各設定の型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingType {
    Bool,
    Int,
    Float,
    Str,
    Char,
}

/// 設定の説明
#[derive(Debug, Clone, Copy)]
pub struct SettingInfo {
    pub name: &'static str,
    pub kind: SettingType,
    /// 変更後に再描画が必要か
    pub render: bool,
    /// 変更後に見た目の再初期化が必要か
    pub reinit: bool,
    pub description: &'static str,
}

pub const SETTINGS: &[SettingInfo] = &[
    SettingInfo { name: "adjust_open", kind: SettingType::Int, render: false, reinit: false, description: "Adjust mode" },
    SettingInfo { name: "default_text", kind: SettingType::Str, render: false, reinit: false, description: "Default text" },
    SettingInfo { name: "labels", kind: SettingType::Bool, render: false, reinit: false, description: "Allow label mode" },
    SettingInfo { name: "list_printer_command", kind: SettingType::Str, render: false, reinit: false, description: "Command to list printers" },
    SettingInfo { name: "n_completion_items", kind: SettingType::Int, render: false, reinit: false, description: "Number of completion items" },
    SettingInfo { name: "page_height", kind: SettingType::Int, render: false, reinit: false, description: "Lines per page of text documents" },
    SettingInfo { name: "print_command", kind: SettingType::Str, render: false, reinit: false, description: "Command used to print" },
    SettingInfo { name: "recolor", kind: SettingType::Bool, render: true, reinit: false, description: "Invert the page colors" },
    SettingInfo { name: "save_position", kind: SettingType::Bool, render: false, reinit: false, description: "Save the current position" },
    SettingInfo { name: "save_zoom_level", kind: SettingType::Bool, render: false, reinit: false, description: "Save the zoom level" },
    SettingInfo { name: "scroll_step", kind: SettingType::Float, render: false, reinit: false, description: "Scroll step" },
    SettingInfo { name: "scroll_wrap", kind: SettingType::Bool, render: false, reinit: false, description: "Wrap scrolling at last page" },
    SettingInfo { name: "search_highlight", kind: SettingType::Char, render: true, reinit: false, description: "Marker drawn beside search results" },
    SettingInfo { name: "show_inputbar", kind: SettingType::Bool, render: false, reinit: true, description: "Show inputbar" },
    SettingInfo { name: "show_statusbar", kind: SettingType::Bool, render: false, reinit: true, description: "Show statusbar" },
    SettingInfo { name: "zoom_max", kind: SettingType::Int, render: false, reinit: false, description: "Zoom maximum" },
    SettingInfo { name: "zoom_min", kind: SettingType::Int, render: false, reinit: false, description: "Zoom minimum" },
    SettingInfo { name: "zoom_step", kind: SettingType::Int, render: false, reinit: false, description: "Zoom step" },
];

/// 設定名から説明を引く
pub fn setting_info(name: &str) -> Option<&'static SettingInfo> {
    SETTINGS.iter().find(|info| info.name == name)
}

/// `set` 後に呼び出し側が行うべき処理
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SettingEffect {
    pub render: bool,
    pub reinit: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub adjust_open: i64,
    pub default_text: String,
    pub labels: bool,
    pub list_printer_command: String,
    pub n_completion_items: i64,
    pub page_height: i64,
    pub print_command: String,
    pub recolor: bool,
    pub save_position: bool,
    pub save_zoom_level: bool,
    pub scroll_step: f64,
    pub scroll_wrap: bool,
    pub search_highlight: char,
    pub show_inputbar: bool,
    pub show_statusbar: bool,
    pub zoom_max: i64,
    pub zoom_min: i64,
    pub zoom_step: i64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            adjust_open: ArgKind::AdjustBestfit.code(),
            default_text: "[No Name]".to_string(),
            labels: false,
            list_printer_command: "lpstat -v | sed -n '/^.*device for \\(.*\\): .*$/s//\\1/p'".to_string(),
            n_completion_items: 15,
            page_height: 50,
            print_command: "lp -d '%s' -P %s %s %s".to_string(),
            recolor: false,
            save_position: true,
            save_zoom_level: true,
            scroll_step: 3.0,
            scroll_wrap: false,
            search_highlight: '>',
            show_inputbar: true,
            show_statusbar: true,
            zoom_max: 400,
            zoom_min: 10,
            zoom_step: 10,
        }
    }
}

enum Slot<'a> {
    Bool(&'a mut bool),
    Int(&'a mut i64),
    Float(&'a mut f64),
    Str(&'a mut String),
    Char(&'a mut char),
}

impl Settings {
    fn slot(&mut self, name: &str) -> Option<Slot<'_>> {
        let slot = match name {
            "adjust_open" => Slot::Int(&mut self.adjust_open),
            "default_text" => Slot::Str(&mut self.default_text),
            "labels" => Slot::Bool(&mut self.labels),
            "list_printer_command" => Slot::Str(&mut self.list_printer_command),
            "n_completion_items" => Slot::Int(&mut self.n_completion_items),
            "page_height" => Slot::Int(&mut self.page_height),
            "print_command" => Slot::Str(&mut self.print_command),
            "recolor" => Slot::Bool(&mut self.recolor),
            "save_position" => Slot::Bool(&mut self.save_position),
            "save_zoom_level" => Slot::Bool(&mut self.save_zoom_level),
            "scroll_step" => Slot::Float(&mut self.scroll_step),
            "scroll_wrap" => Slot::Bool(&mut self.scroll_wrap),
            "search_highlight" => Slot::Char(&mut self.search_highlight),
            "show_inputbar" => Slot::Bool(&mut self.show_inputbar),
            "show_statusbar" => Slot::Bool(&mut self.show_statusbar),
            "zoom_max" => Slot::Int(&mut self.zoom_max),
            "zoom_min" => Slot::Int(&mut self.zoom_min),
            "zoom_step" => Slot::Int(&mut self.zoom_step),
            _ => return None,
        };
        Some(slot)
    }

    /// `set <name> [value...]` を適用する
    ///
    /// * bool: 値がなければ反転、`false` / `0` なら偽、それ以外は真
    /// * int: 値は 1 つだけ。引数名ならそのコード値
    /// * string: 残りのトークンを空白で連結
    /// * char: 先頭の 1 文字
    pub fn set(&mut self, name: &str, values: &[&str]) -> Result<SettingEffect, ConfigError> {
        let info = setting_info(name).ok_or_else(|| ConfigError::UnknownOption {
            name: name.to_string(),
        })?;
        let missing = || ConfigError::MissingValue {
            key: name.to_string(),
        };
        let invalid = |value: &str| ConfigError::InvalidValue {
            key: name.to_string(),
            value: value.to_string(),
        };

        let slot = self.slot(name).ok_or_else(|| ConfigError::UnknownOption {
            name: name.to_string(),
        })?;

        match slot {
            Slot::Bool(value) => {
                *value = match values.first() {
                    Some(&"false") | Some(&"0") => false,
                    Some(_) => true,
                    None => !*value,
                };
            }
            Slot::Int(value) => {
                let [token] = values else {
                    return Err(missing());
                };
                let token: &str = token;
                *value = match ArgKind::from_name(token) {
                    Some(kind) => kind.code(),
                    None => token.parse::<i64>().map_err(|_| invalid(token))?,
                };
            }
            Slot::Float(value) => {
                let token: &str = values.first().ok_or_else(missing)?;
                *value = token.parse::<f64>().map_err(|_| invalid(token))?;
            }
            Slot::Str(value) => {
                if values.is_empty() {
                    return Err(missing());
                }
                *value = values.join(" ");
            }
            Slot::Char(value) => {
                let token: &str = values.first().ok_or_else(missing)?;
                *value = token.chars().next().ok_or_else(missing)?;
            }
        }

        log::debug!("setting {} changed", name);
        Ok(SettingEffect {
            render: info.render,
            reinit: info.reinit,
        })
    }

    /// 現在値を文字列で取得（補完の説明などに使う）
    pub fn value_string(&self, name: &str) -> Option<String> {
        let value = match name {
            "adjust_open" => self.adjust_open.to_string(),
            "default_text" => self.default_text.clone(),
            "labels" => self.labels.to_string(),
            "list_printer_command" => self.list_printer_command.clone(),
            "n_completion_items" => self.n_completion_items.to_string(),
            "page_height" => self.page_height.to_string(),
            "print_command" => self.print_command.clone(),
            "recolor" => self.recolor.to_string(),
            "save_position" => self.save_position.to_string(),
            "save_zoom_level" => self.save_zoom_level.to_string(),
            "scroll_step" => self.scroll_step.to_string(),
            "scroll_wrap" => self.scroll_wrap.to_string(),
            "search_highlight" => self.search_highlight.to_string(),
            "show_inputbar" => self.show_inputbar.to_string(),
            "show_statusbar" => self.show_statusbar.to_string(),
            "zoom_max" => self.zoom_max.to_string(),
            "zoom_min" => self.zoom_min.to_string(),
            "zoom_step" => self.zoom_step.to_string(),
            _ => return None,
        };
        Some(value)
    }
}
