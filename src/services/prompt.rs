//! 批阅提示词

/// 评分标准在模板中的占位符
pub const RUBRIC_PLACEHOLDER: &str = "{rubric}";

const DEFAULT_TEMPLATE: &str = r#"
# 角色
你是一名严谨、经验丰富的大学实验课程助教。

# 任务
请严格根据我接下来提供的【评分标准】，批改学生提交的实验报告。你需要：
1.  对报告的各个部分进行详细评价。
2.  总结报告的主要优点和待改进之处。
3.  根据各项表现和【评分标准】中的分值，给出一个建议的百分制分数。

# 【评分标准】
---
{rubric}
---

# 输出格式与规则
请严格遵守以下所有规则：
1.  必须只输出纯文本。绝对禁止使用任何Markdown、HTML、XML或任何其他标记语言（例如，不要使用 #, *, **, ``, <sup> 等符号）。
2.  对于公式，请使用普通字符来表示，例如 "2^-delta_delta_Ct"。
3.  严格按照以下格式进行输出，使用等号长线作为分隔符：

====================================
综合评价:
[在这里用一句话总结报告的整体水平]

分项评语:
  - [评分标准中的第一项名称]: [在此处填写对该项的评价...]
  - [评分标准中的第二项名称]: [在此处填写对该项的评价...]
  - [以此类推，根据评分标准列出所有项...]

主要优点:
  - [在此处分点列出报告的优点]

主要待改进点:
  - [在此处分点列出具体的、可操作的修改建议]

建议分数:
[在此处给出一个具体的百分制分数，例如：88/100]
====================================

现在，请开始批改这份报告：
"#;

/// 批阅提示词构建器
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    template: String,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self {
            template: DEFAULT_TEMPLATE.to_string(),
        }
    }

    /// 使用自定义模板，模板中的 `{rubric}` 会被替换为评分标准
    pub fn with_template(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// 拼装完整提示词：模板（已代入评分标准）+ 报告正文
    pub fn build(&self, rubric: &str, report_text: &str) -> String {
        format!(
            "{}\n\n{}",
            self.template.replace(RUBRIC_PLACEHOLDER, rubric),
            report_text
        )
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rubric_substituted_and_report_appended() {
        let prompt = PromptBuilder::new().build("实验原理 20分", "这是我的实验报告");
        assert!(prompt.contains("---\n实验原理 20分\n---"));
        assert!(prompt.ends_with("\n\n这是我的实验报告"));
        assert!(!prompt.contains(RUBRIC_PLACEHOLDER));
    }

    #[test]
    fn test_custom_template() {
        let builder = PromptBuilder::with_template("标准: {rubric}");
        assert_eq!(builder.build("A", "正文"), "标准: A\n\n正文");
    }
}
