//! 文本提取服务 - 业务能力层
//!
//! 只负责"把一份报告变成纯文本"，不关心批阅流程
//!
//! - `.docx`：解压后读取 `word/document.xml`，每个段落一行
//! - `.pdf`：使用 `pdf-extract` 逐页提取并拼接

use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use regex::{Captures, Regex};
use tracing::debug;
use zip::ZipArchive;

use crate::error::{ExtractionError, ExtractionResult};

/// 文本提取能力
///
/// 实现必须在有限时间内返回，不能无限阻塞
pub trait TextExtractor: Send + Sync {
    fn extract(&self, path: &Path) -> ExtractionResult;
}

/// 支持的报告格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Docx,
    Pdf,
}

impl DocumentKind {
    /// 根据扩展名判断格式（不区分大小写）
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "docx" => Some(DocumentKind::Docx),
            "pdf" => Some(DocumentKind::Pdf),
            _ => None,
        }
    }
}

/// 默认的文本提取器
#[derive(Debug, Default, Clone, Copy)]
pub struct DocumentExtractor;

impl TextExtractor for DocumentExtractor {
    fn extract(&self, path: &Path) -> ExtractionResult {
        let file_name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();

        let result = match DocumentKind::from_path(path) {
            Some(DocumentKind::Docx) => extract_docx(path),
            Some(DocumentKind::Pdf) => extract_pdf(path),
            None => return Err(ExtractionError::UnsupportedFormat { file_name }),
        };

        result.map_err(|e| ExtractionError::ReadFailed {
            file_name,
            reason: format!("{:#}", e),
        })
    }
}

fn extract_docx(path: &Path) -> Result<String> {
    let file = File::open(path).context("无法打开文件")?;
    let mut archive = ZipArchive::new(file).context("不是有效的docx文件")?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .context("docx中缺少 word/document.xml")?
        .read_to_string(&mut xml)
        .context("读取 word/document.xml 失败")?;

    let text = document_xml_to_text(&xml)?;
    debug!("docx 提取完成: {} 字符", text.chars().count());
    Ok(text)
}

/// 把 `word/document.xml` 转换为纯文本，段落之间用换行分隔
///
/// 按标签逐个扫描并记录嵌套深度：文本框（`w:txbxContent`）里的段落单独成行，
/// 外层段落在文本框之后的内容照常保留
fn document_xml_to_text(xml: &str) -> Result<String> {
    let tag_re = Regex::new(r"<(/?)([A-Za-z_][\w.:-]*)[^>]*?(/?)>")?;
    let entity_re = Regex::new(r"&(#[xX][0-9A-Fa-f]+|#[0-9]+|lt|gt|quot|apos|amp);")?;

    let mut scan = DocumentScan::default();
    let mut cursor = 0;

    for cap in tag_re.captures_iter(xml) {
        let Some(tag) = cap.get(0) else { continue };
        if scan.in_text() {
            scan.push(&unescape_xml(&entity_re, &xml[cursor..tag.start()]));
        }
        cursor = tag.end();

        let name = &cap[2];
        if cap[1].is_empty() {
            scan.open(name, !cap[3].is_empty());
        } else {
            scan.close(name);
        }
    }

    Ok(scan.paragraphs.join("\n"))
}

/// 扫描 document.xml 时的状态
#[derive(Debug, Default)]
struct DocumentScan {
    /// 已结束的顶层段落
    paragraphs: Vec<String>,
    /// 尚未结束的段落，文本框会让段落嵌套
    open: Vec<String>,
    run_depth: usize,
    text_depth: usize,
    /// `mc:Fallback` 是同一内容的旧版重复，跳过
    fallback_depth: usize,
}

impl DocumentScan {
    fn in_text(&self) -> bool {
        self.text_depth > 0 && self.fallback_depth == 0
    }

    fn open(&mut self, name: &str, self_closing: bool) {
        if name == "mc:Fallback" {
            if !self_closing {
                self.fallback_depth += 1;
            }
            return;
        }
        if self.fallback_depth > 0 {
            return;
        }

        match name {
            "w:p" if self_closing => self.end_paragraph(String::new()),
            "w:p" => {
                if let Some(parent) = self.open.last_mut() {
                    if !parent.is_empty() && !parent.ends_with('\n') {
                        parent.push('\n');
                    }
                }
                self.open.push(String::new());
            }
            "w:r" if !self_closing => self.run_depth += 1,
            "w:t" if !self_closing => self.text_depth += 1,
            // pPr 里的 w:tab 是制表位定义，只有 run 内的才是字符
            "w:tab" if self.run_depth > 0 => self.push("\t"),
            "w:br" | "w:cr" if self.run_depth > 0 => self.push("\n"),
            _ => {}
        }
    }

    fn close(&mut self, name: &str) {
        if name == "mc:Fallback" {
            self.fallback_depth = self.fallback_depth.saturating_sub(1);
            return;
        }
        if self.fallback_depth > 0 {
            return;
        }

        match name {
            "w:p" => {
                if let Some(text) = self.open.pop() {
                    self.end_paragraph(text);
                }
            }
            "w:r" => self.run_depth = self.run_depth.saturating_sub(1),
            "w:t" => self.text_depth = self.text_depth.saturating_sub(1),
            _ => {}
        }
    }

    fn push(&mut self, text: &str) {
        if let Some(paragraph) = self.open.last_mut() {
            paragraph.push_str(text);
        }
    }

    fn end_paragraph(&mut self, text: String) {
        let text = text.trim_end_matches('\n');
        match self.open.last_mut() {
            Some(parent) => {
                parent.push_str(text);
                parent.push('\n');
            }
            None => self.paragraphs.push(text.to_string()),
        }
    }
}

/// 还原预定义实体与数字字符引用，无法识别的保持原样
fn unescape_xml(entity_re: &Regex, text: &str) -> String {
    entity_re
        .replace_all(text, |cap: &Captures| {
            let entity = &cap[1];
            let decoded = match entity {
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "amp" => Some('&'),
                _ => {
                    let hex = entity
                        .strip_prefix("#x")
                        .or_else(|| entity.strip_prefix("#X"));
                    let code = match hex {
                        Some(hex) => u32::from_str_radix(hex, 16).ok(),
                        None => entity[1..].parse::<u32>().ok(),
                    };
                    code.and_then(char::from_u32)
                }
            };
            decoded.map_or_else(|| cap[0].to_string(), String::from)
        })
        .into_owned()
}

fn extract_pdf(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).context("无法打开文件")?;
    let pages = pdf_extract::extract_text_from_mem_by_pages(&bytes)
        .map_err(|e| anyhow::anyhow!("PDF解析失败: {}", e))?;
    debug!("pdf 提取完成: {} 页", pages.len());
    Ok(pages.concat())
}
