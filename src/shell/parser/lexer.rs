use super::ast::RedirectOp;

/// 一段命令切分后的原始词和重定向子句
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct StageTokens {
    pub words: Vec<String>,
    pub redirect: Option<(RedirectOp, String)>,
}

pub struct Lexer<'a> {
    input: &'a str,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input }
    }

    /// 按 `|` 切分，保留每段首尾空白
    pub fn stage_texts(&self) -> impl Iterator<Item = &'a str> {
        self.input.split('|')
    }

    pub fn tokenize(&self) -> Vec<StageTokens> {
        self.stage_texts().map(tokenize_stage).collect()
    }
}

pub fn tokenize_stage(text: &str) -> StageTokens {
    let (command, redirect) = match text.split_once('>') {
        Some((head, rest)) => {
            let (operator, target) = match rest.strip_prefix('>') {
                Some(target) => (RedirectOp::Append, target),
                None => (RedirectOp::Output, rest),
            };
            // 目标只取到下一个 `>` 为止
            let target = target.split('>').next().unwrap_or_default();
            (head, Some((operator, target.trim_matches(' ').to_string())))
        }
        None => (text, None),
    };

    StageTokens {
        words: split_words(command),
        redirect,
    }
}

/// 只按空格切分，制表符等其他空白属于词的一部分
fn split_words(text: &str) -> Vec<String> {
    text.split(' ')
        .filter(|word| !word.is_empty())
        .map(str::to_string)
        .collect()
}
