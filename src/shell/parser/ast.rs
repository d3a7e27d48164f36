/// 单个阶段允许的最多词数（命令名 + 11 个参数）
pub const MAX_ARGS: usize = 12;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum RedirectOp {
    Output, // >
    Append, // >>
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Redirection {
    pub operator: RedirectOp,
    pub filename: String,
}

/// 管道中的一段命令，argv[0] 即命令名
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Stage {
    pub argv: Vec<String>,
    pub redirection: Option<Redirection>,
}

impl Stage {
    pub fn program(&self) -> &str {
        self.argv.first().map(String::as_str).unwrap_or_default()
    }

    /// 取走重定向目标，执行时只会被使用一次
    pub fn take_redirection(&mut self) -> Option<Redirection> {
        self.redirection.take()
    }
}

/// 至少包含一个阶段的管道
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    pub fn new(stages: Vec<Stage>) -> Option<Self> {
        if stages.is_empty() {
            None
        } else {
            Some(Self { stages })
        }
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn last_mut(&mut self) -> Option<&mut Stage> {
        self.stages.last_mut()
    }

    /// 只有一个阶段时返回它，用于识别 cd / exit 这类内建命令
    pub fn single(&self) -> Option<&Stage> {
        match self.stages.as_slice() {
            [stage] => Some(stage),
            _ => None,
        }
    }
}
