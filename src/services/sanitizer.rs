//! 评语清理 - 业务能力层
//!
//! 模型偶尔会无视"只输出纯文本"的要求，这里把常见的 Markdown 记号去掉

/// 按顺序执行的替换规则，顺序不能调整
const REPLACEMENTS: [(&str, &str); 3] = [("### ", ""), ("**", ""), ("* ", "  - ")];

/// 清理模型返回的评语
///
/// 内容缺失时返回空字符串
pub fn sanitize_feedback(raw: Option<&str>) -> String {
    let Some(text) = raw else {
        return String::new();
    };

    REPLACEMENTS
        .iter()
        .fold(text.to_string(), |acc, (from, to)| acc.replace(from, to))
        .trim()
        .to_string()
}
