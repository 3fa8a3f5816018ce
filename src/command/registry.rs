//! コマンド登録
//!
//! コマンド名・省略形・補完プロバイダをまとめて持つ。起動時に組み込み
//! コマンドで初期化され、実行は `Viewer` が `CommandAction` で振り分ける。

use crate::completion::{
    BookmarkProvider, CompletionProvider, ExportProvider, PathProvider, PrinterProvider,
    SettingProvider,
};
use crate::search::SearchDirection;

/// コマンドの処理内容
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandAction {
    Bookmark,
    Close,
    DeleteBookmark,
    Export,
    Info,
    Map,
    Offset,
    Open,
    OpenBookmark,
    Print,
    Quit,
    Rotate,
    Set,
    Write,
    WriteForce,
}

/// 登録済みコマンド
#[derive(Debug)]
pub struct Command {
    pub name: &'static str,
    pub abbreviation: Option<&'static str>,
    pub action: CommandAction,
    pub provider: Option<Box<dyn CompletionProvider>>,
    pub description: &'static str,
}

impl Command {
    pub fn new(name: &'static str, action: CommandAction, description: &'static str) -> Self {
        Self {
            name,
            abbreviation: None,
            action,
            provider: None,
            description,
        }
    }

    pub fn abbreviated(mut self, abbreviation: &'static str) -> Self {
        self.abbreviation = Some(abbreviation);
        self
    }

    pub fn completed_by(mut self, provider: impl CompletionProvider + 'static) -> Self {
        self.provider = Some(Box::new(provider));
        self
    }

    /// 名前か省略形に完全一致するか
    pub fn is_named(&self, token: &str) -> bool {
        self.name == token || self.abbreviation == Some(token)
    }

    /// 名前か省略形が `token` で始まるか
    pub fn has_prefix(&self, token: &str) -> bool {
        self.name.starts_with(token)
            || self
                .abbreviation
                .is_some_and(|abbreviation| abbreviation.starts_with(token))
    }
}

/// 1 文字の識別子で始まる特殊コマンド（`/` と `?`）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecialCommand {
    pub identifier: char,
    pub direction: SearchDirection,
    /// キー入力のたびに実行するか
    pub always: bool,
}

#[derive(Debug, Default)]
pub struct CommandRegistry {
    commands: Vec<Command>,
    specials: Vec<SpecialCommand>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 組み込みコマンド一式
    pub fn builtin() -> Self {
        use CommandAction as A;

        let mut registry = Self::new();
        let commands = [
            Command::new("bookmark", A::Bookmark, "Add a bookmark")
                .abbreviated("b")
                .completed_by(BookmarkProvider),
            Command::new("close", A::Close, "Close current file").abbreviated("c"),
            Command::new("delete-bookmark", A::DeleteBookmark, "Delete a bookmark")
                .completed_by(BookmarkProvider),
            Command::new("export", A::Export, "Export images or attachments")
                .abbreviated("e")
                .completed_by(ExportProvider),
            Command::new("info", A::Info, "Show information about the document").abbreviated("i"),
            Command::new("map", A::Map, "Map keybinding to a function").abbreviated("m"),
            Command::new("offset", A::Offset, "Set page offset"),
            Command::new("open", A::Open, "Open a file")
                .abbreviated("o")
                .completed_by(PathProvider::new()),
            Command::new("open-bookmark", A::OpenBookmark, "Open a bookmark")
                .abbreviated("ob")
                .completed_by(BookmarkProvider),
            Command::new("print", A::Print, "Print the document")
                .abbreviated("p")
                .completed_by(PrinterProvider),
            Command::new("quit", A::Quit, "Quit folio").abbreviated("q"),
            Command::new("rotate", A::Rotate, "Rotate the page").abbreviated("r"),
            Command::new("set", A::Set, "Set an option")
                .abbreviated("s")
                .completed_by(SettingProvider),
            Command::new("write", A::Write, "Save the document")
                .abbreviated("w")
                .completed_by(PathProvider::new()),
            Command::new("write!", A::WriteForce, "Save the document (and overwrite)")
                .completed_by(PathProvider::new()),
        ];
        for command in commands {
            registry.register(command);
        }

        registry.register_special(SpecialCommand {
            identifier: '/',
            direction: SearchDirection::Forward,
            always: true,
        });
        registry.register_special(SpecialCommand {
            identifier: '?',
            direction: SearchDirection::Backward,
            always: true,
        });

        registry
    }

    /// コマンドを追加する（同名は置き換え）
    pub fn register(&mut self, command: Command) {
        match self.commands.iter_mut().find(|existing| existing.name == command.name) {
            Some(existing) => *existing = command,
            None => self.commands.push(command),
        }
    }

    pub fn register_special(&mut self, special: SpecialCommand) {
        self.specials.retain(|existing| existing.identifier != special.identifier);
        self.specials.push(special);
    }

    /// 補完プロバイダを差し替える。該当コマンドがなければ false
    pub fn set_provider(&mut self, name: &str, provider: Box<dyn CompletionProvider>) -> bool {
        match self.commands.iter_mut().find(|command| command.name == name) {
            Some(command) => {
                command.provider = Some(provider);
                true
            }
            None => false,
        }
    }

    pub fn commands(&self) -> std::slice::Iter<'_, Command> {
        self.commands.iter()
    }

    /// 名前か省略形で完全一致検索
    pub fn find(&self, token: &str) -> Option<&Command> {
        self.commands.iter().find(|command| command.is_named(token))
    }

    pub fn special(&self, identifier: char) -> Option<&SpecialCommand> {
        self.specials
            .iter()
            .find(|special| special.identifier == identifier)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
