use std::fmt;

/// 一条命令行执行完毕后的汇总：`+ completed '<line>' [c0][c1]...`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionReport {
    command: String,
    codes: Vec<i32>,
}

impl ExecutionReport {
    pub fn new(command: &str) -> Self {
        Self {
            command: command.to_string(),
            codes: Vec::new(),
        }
    }

    pub fn with_codes(command: &str, codes: Vec<i32>) -> Self {
        Self {
            command: command.to_string(),
            codes,
        }
    }

    pub fn push(&mut self, code: i32) {
        self.codes.push(code);
    }

    #[cfg(test)]
    pub fn codes(&self) -> &[i32] {
        &self.codes
    }
}

impl fmt::Display for ExecutionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "+ completed '{}' ", self.command)?;
        for code in &self.codes {
            write!(f, "[{}]", code)?;
        }
        Ok(())
    }
}
