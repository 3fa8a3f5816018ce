//! プレーンテキスト用エンジン
//!
//! 改ページ文字（`\x0c`）でページを区切り、さらに一定行数ごとに分割する。
//! `#` で始まる行を見出しとして目次を作る。

use std::fs;
use std::path::{Path, PathBuf};

use unicode_width::UnicodeWidthStr;

use super::{DocumentEngine, ExportKind, OutlineEntry, PageRect, PageSize};
use crate::error::{FileError, Result};

const FORM_FEED: char = '\u{0c}';

#[derive(Debug, Clone)]
pub struct TextDocument {
    path: PathBuf,
    raw: String,
    pages: Vec<Vec<String>>,
    outline: Vec<OutlineEntry>,
}

impl TextDocument {
    /// ファイルを読み込む
    pub fn open(path: &Path, lines_per_page: usize) -> Result<Self> {
        let bytes = fs::read(path).map_err(|err| FileError::from_io(&err, path))?;
        let raw = String::from_utf8_lossy(&bytes).into_owned();
        Ok(Self::from_text(path, raw, lines_per_page))
    }

    /// 文字列から構築する
    pub fn from_text(path: &Path, raw: String, lines_per_page: usize) -> Self {
        let lines_per_page = lines_per_page.max(1);
        let mut pages = Vec::new();

        for section in raw.split(FORM_FEED) {
            let lines: Vec<String> = section.lines().map(|line| line.replace('\t', "    ")).collect();
            if lines.is_empty() {
                pages.push(Vec::new());
                continue;
            }
            for chunk in lines.chunks(lines_per_page) {
                pages.push(chunk.to_vec());
            }
        }

        if pages.is_empty() {
            pages.push(Vec::new());
        }

        let outline = build_outline(&pages);

        Self {
            path: path.to_path_buf(),
            raw,
            pages,
            outline,
        }
    }

    fn line_count(&self) -> usize {
        self.pages.iter().map(Vec::len).sum()
    }
}

fn heading_level(line: &str) -> Option<(usize, &str)> {
    let level = line.chars().take_while(|c| *c == '#').count();
    if level == 0 {
        return None;
    }
    let title = line[level..].trim();
    if title.is_empty() || !line[level..].starts_with(' ') {
        return None;
    }
    Some((level, title))
}

fn build_outline(pages: &[Vec<String>]) -> Vec<OutlineEntry> {
    let headings: Vec<(usize, OutlineEntry)> = pages
        .iter()
        .enumerate()
        .flat_map(|(page, lines)| {
            lines.iter().filter_map(move |line| {
                heading_level(line).map(|(level, title)| {
                    (
                        level,
                        OutlineEntry {
                            title: title.to_string(),
                            page,
                            children: Vec::new(),
                        },
                    )
                })
            })
        })
        .collect();

    let mut roots = Vec::new();
    let mut iter = headings.into_iter().peekable();
    collect_level(&mut iter, 0, &mut roots);
    roots
}

fn collect_level<I>(iter: &mut std::iter::Peekable<I>, parent_level: usize, out: &mut Vec<OutlineEntry>)
where
    I: Iterator<Item = (usize, OutlineEntry)>,
{
    while let Some((level, _)) = iter.peek() {
        if *level <= parent_level {
            return;
        }
        let Some((level, mut entry)) = iter.next() else {
            return;
        };
        collect_level(iter, level, &mut entry.children);
        out.push(entry);
    }
}

impl DocumentEngine for TextDocument {
    fn path(&self) -> &Path {
        &self.path
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_label(&self, page: usize) -> Option<String> {
        (page < self.pages.len()).then(|| (page + 1).to_string())
    }

    fn page_size(&self, page: usize) -> Option<PageSize> {
        let lines = self.pages.get(page)?;
        let width = lines
            .iter()
            .map(|line| UnicodeWidthStr::width(line.as_str()))
            .max()
            .unwrap_or(0)
            .max(1);
        Some(PageSize {
            width: width as f64,
            height: lines.len().max(1) as f64,
        })
    }

    fn page_lines(&self, page: usize) -> Option<Vec<String>> {
        self.pages.get(page).cloned()
    }

    fn find_text(&self, page: usize, query: &str) -> Vec<PageRect> {
        let Some(lines) = self.pages.get(page) else {
            return Vec::new();
        };
        if query.is_empty() {
            return Vec::new();
        }

        let query_len = query.chars().count();
        let mut results = Vec::new();
        for (line_index, line) in lines.iter().enumerate() {
            for (byte_index, _) in line.match_indices(query) {
                let start_column = line[..byte_index].chars().count();
                results.push(PageRect {
                    line: line_index,
                    start_column,
                    end_column: start_column + query_len,
                });
            }
        }
        results
    }

    fn metadata(&self) -> Vec<(String, String)> {
        vec![
            ("Title".to_string(), super::display_name(&self.path)),
            ("Path".to_string(), self.path.display().to_string()),
            ("Pages".to_string(), self.pages.len().to_string()),
            ("Lines".to_string(), self.line_count().to_string()),
            ("Size".to_string(), format!("{} bytes", self.raw.len())),
        ]
    }

    fn outline(&self) -> Vec<OutlineEntry> {
        self.outline.clone()
    }

    fn save_as(&self, path: &Path) -> Result<()> {
        fs::write(path, self.raw.as_bytes()).map_err(|err| FileError::from_io(&err, path))?;
        Ok(())
    }

    fn export(&self, _kind: ExportKind, _directory: &Path) -> Result<usize> {
        // テキスト文書は画像も添付も持たない
        Ok(0)
    }
}
