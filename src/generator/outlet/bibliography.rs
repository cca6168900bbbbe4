use std::sync::LazyLock;

use regex::Regex;

use crate::types::ArticleRecord;

static YEAR_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}").expect("static regex is valid"));

/// 年份未知时使用的占位符
pub const UNKNOWN_YEAR: &str = "????";

/// 取eprint中第一个 `.` 之前部分的前四个字符作为年份，不是四位数字时返回占位符
pub fn publication_year(eprint: &str) -> &str {
    let numeric = eprint.split('.').next().unwrap_or(eprint);
    YEAR_PREFIX
        .find(numeric)
        .map(|m| m.as_str())
        .unwrap_or(UNKNOWN_YEAR)
}

/// 渲染一条参考文献，`key` 为文章在已筛选列表中的序号
pub fn render_entry(article: &ArticleRecord, key: usize) -> String {
    let author = match article.authors.first() {
        Some(first) => format!("{} et al.", first),
        None => "Anonymous et al.".to_string(),
    };
    let eprint = article.eprint();

    let mut fields = vec![
        format!("  title = {{{}}}", article.title),
        format!("  author = {{{}}}", author),
        format!("  eprint = {{{}}}", eprint),
        "  eprinttype = {arxiv}".to_string(),
        format!("  year = {{{}}}", publication_year(eprint)),
    ];
    if let Some(doi) = &article.doi {
        fields.push(format!("  doi = {{{}}}", doi));
    }

    format!("@article{{{},\n{}\n}}", key, fields.join(",\n"))
}

/// 渲染全部参考文献，每条之后换行
pub fn create_bibliography(articles: &[ArticleRecord]) -> String {
    articles
        .iter()
        .enumerate()
        .map(|(key, article)| render_entry(article, key) + "\n")
        .collect()
}

/// 入选文章清单，供人工核对
pub fn render_article_listing(articles: &[ArticleRecord]) -> String {
    let separator = "-".repeat(80);
    let mut listing = String::new();

    for (key, article) in articles.iter().enumerate() {
        listing.push_str(&format!("Article {}\n", key));
        listing.push_str(&format!("Title: {}\n", article.title));
        listing.push_str(&format!("Authors: {}\n", article.authors.join(", ")));
        listing.push_str(&format!("Link: {}\n", article.entry_id));
        listing.push_str(&format!(
            "DOI: {}\n",
            article.doi.as_deref().unwrap_or("n/a")
        ));
        listing.push_str("Abstract:\n");
        listing.push_str(&format!("{}\n", article.summary));
        listing.push_str(&format!("{}\n\n", separator));
    }

    listing
}
