use std::io::Read;
use std::path::Path;

use crate::error::{Error, Result};

/// Formats text can be pulled out of. Legacy binary Office files and images
/// pass the upload filter but have no extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    PlainText,
    Pdf,
    Docx,
    Pptx,
    Spreadsheet,
}

impl DocumentFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "txt" | "md" | "csv" => Some(Self::PlainText),
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            "pptx" => Some(Self::Pptx),
            "xlsx" | "xls" => Some(Self::Spreadsheet),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

/// Text of one source page (PDF page, slide, or sheet), numbered from 1.
#[derive(Debug, Clone, PartialEq)]
pub struct PageText {
    pub number: usize,
    pub text: String,
}

pub fn extract_pages(path: &Path) -> Result<Vec<PageText>> {
    let format = DocumentFormat::from_path(path).ok_or_else(|| {
        Error::UnsupportedFormat(
            path.extension()
                .map(|e| format!(".{}", e.to_string_lossy()))
                .unwrap_or_else(|| path.display().to_string()),
        )
    })?;

    let texts = match format {
        DocumentFormat::PlainText => extract_plain_text(path)?,
        DocumentFormat::Pdf => extract_pdf(path)?,
        DocumentFormat::Docx => vec![extract_docx(path)?],
        DocumentFormat::Pptx => extract_pptx(path)?,
        DocumentFormat::Spreadsheet => extract_spreadsheet(path)?,
    };

    let pages: Vec<PageText> = texts
        .into_iter()
        .enumerate()
        .map(|(i, text)| PageText { number: i + 1, text })
        .collect();

    if pages.iter().all(|p| p.text.trim().is_empty()) {
        return Err(Error::EmptyDocument);
    }
    Ok(pages)
}

fn extraction_error(path: &Path, message: impl ToString) -> Error {
    Error::Extraction {
        file: path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string()),
        message: message.to_string(),
    }
}

/// Form feeds separate pages in plain-text exports.
fn split_form_feeds(text: &str) -> Vec<String> {
    text.split('\u{c}').map(|page| page.to_string()).collect()
}

fn extract_plain_text(path: &Path) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path).map_err(|e| extraction_error(path, e))?;
    Ok(split_form_feeds(&text))
}

/// One entry per PDF page, blank pages included so numbering stays aligned.
fn extract_pdf(path: &Path) -> Result<Vec<String>> {
    pdf_extract::extract_text_by_pages(path).map_err(|e| extraction_error(path, e))
}

fn extract_docx(path: &Path) -> Result<String> {
    let file = std::fs::File::open(path).map_err(|e| extraction_error(path, e))?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| extraction_error(path, e))?;

    let mut xml_content = String::new();
    match archive.by_name("word/document.xml") {
        Ok(mut entry) => {
            entry
                .read_to_string(&mut xml_content)
                .map_err(|e| extraction_error(path, e))?;
        }
        Err(_) => return Err(extraction_error(path, "no word/document.xml in archive")),
    }

    Ok(extract_text_from_xml(&xml_content, "w:t"))
}

fn extract_pptx(path: &Path) -> Result<Vec<String>> {
    let file = std::fs::File::open(path).map_err(|e| extraction_error(path, e))?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| extraction_error(path, e))?;

    let mut slides: Vec<(usize, String)> = Vec::new();
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(|e| extraction_error(path, e))?;
        let name = entry.name().to_string();

        if let Some(number) = slide_number(&name) {
            let mut xml_content = String::new();
            entry
                .read_to_string(&mut xml_content)
                .map_err(|e| extraction_error(path, e))?;
            slides.push((number, extract_text_from_xml(&xml_content, "a:t")));
        }
    }

    // zip order is arbitrary; slide10 must follow slide9
    slides.sort_by_key(|(number, _)| *number);
    Ok(slides.into_iter().map(|(_, text)| text).collect())
}

fn slide_number(entry_name: &str) -> Option<usize> {
    entry_name
        .strip_prefix("ppt/slides/slide")?
        .strip_suffix(".xml")?
        .parse()
        .ok()
}

fn extract_spreadsheet(path: &Path) -> Result<Vec<String>> {
    use calamine::{open_workbook_auto, Reader};

    let mut workbook = open_workbook_auto(path).map_err(|e| extraction_error(path, e))?;
    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();

    let mut sheets = Vec::new();
    for sheet_name in sheet_names {
        let Ok(range) = workbook.worksheet_range(&sheet_name) else {
            continue;
        };
        let rows: Vec<String> = range
            .rows()
            .map(|row| {
                row.iter()
                    .map(|cell| cell.to_string())
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
                    .join("\t")
            })
            .filter(|line| !line.is_empty())
            .collect();
        sheets.push(format!("{}\n{}", sheet_name, rows.join("\n")));
    }

    Ok(sheets)
}

fn extract_text_from_xml(xml: &str, tag: &str) -> String {
    let open_tag = format!("<{}", tag);
    let close_tag = format!("</{}>", tag);
    let mut texts = Vec::new();
    let mut search_from = 0;

    while let Some(open_pos) = xml[search_from..].find(&open_tag) {
        let abs_open = search_from + open_pos;
        let after_name = abs_open + open_tag.len();
        // <w:tab/> and friends share the prefix
        if !matches!(xml[after_name..].chars().next(), Some('>') | Some(' ')) {
            search_from = after_name;
            continue;
        }
        let Some(tag_end) = xml[abs_open..].find('>') else {
            break;
        };
        let content_start = abs_open + tag_end + 1;
        let Some(close_pos) = xml[content_start..].find(&close_tag) else {
            break;
        };
        let content = &xml[content_start..content_start + close_pos];
        if !content.is_empty() {
            texts.push(content.to_string());
        }
        search_from = content_start + close_pos + close_tag.len();
    }

    texts.join(" ")
}
