use super::ast::{Pipeline, Redirection, Stage, MAX_ARGS};
use super::lexer::{Lexer, StageTokens};
use super::validator::validate;
use super::ParseError;

pub struct Parser<'a> {
    line: &'a str,
}

impl<'a> Parser<'a> {
    pub fn new(line: &'a str) -> Self {
        Parser { line }
    }

    pub fn parse_pipeline(&self) -> Result<Pipeline, ParseError> {
        validate(self.line)?;

        let tokens = Lexer::new(self.line).tokenize();
        let count = tokens.len();
        let mut stages = Vec::with_capacity(count);

        for (index, stage_tokens) in tokens.into_iter().enumerate() {
            let stage = Self::parse_stage(stage_tokens)?;
            // 只有最后一段可以带重定向
            if stage.redirection.is_some() && index + 1 != count {
                return Err(ParseError::MislocatedRedirection);
            }
            stages.push(stage);
        }

        Pipeline::new(stages).ok_or(ParseError::MissingCommand)
    }

    fn parse_stage(tokens: StageTokens) -> Result<Stage, ParseError> {
        if tokens.words.is_empty() {
            return Err(ParseError::MissingCommand);
        }
        if tokens.words.len() > MAX_ARGS {
            return Err(ParseError::TooManyArguments);
        }

        let redirection = match tokens.redirect {
            Some((_, filename)) if filename.is_empty() => return Err(ParseError::NoOutputFile),
            Some((operator, filename)) => Some(Redirection { operator, filename }),
            None => None,
        };

        Ok(Stage {
            argv: tokens.words,
            redirection,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::ast::RedirectOp;
    use super::*;

    #[allow(clippy::unwrap_used)]
    #[test]
    fn test_simple_command() {
        let pipeline = Parser::new("echo hello").parse_pipeline().unwrap();
        let stage = pipeline.single().unwrap();
        assert_eq!(stage.program(), "echo");
        assert_eq!(stage.argv, vec!["echo", "hello"]);
        assert!(stage.redirection.is_none());
    }

    #[allow(clippy::unwrap_used)]
    #[test]
    fn test_pipeline() {
        let pipeline = Parser::new("printf abc | wc -c").parse_pipeline().unwrap();
        assert_eq!(pipeline.len(), 2);
        assert_eq!(pipeline.stages()[0].argv, vec!["printf", "abc"]);
        assert_eq!(pipeline.stages()[1].argv, vec!["wc", "-c"]);
        assert!(pipeline.single().is_none());
    }

    #[allow(clippy::unwrap_used)]
    #[test]
    fn test_redirection_on_last_stage() {
        let mut pipeline = Parser::new("cat a | sort >> sorted.txt")
            .parse_pipeline()
            .unwrap();
        let last = pipeline.last_mut().unwrap();
        assert_eq!(
            last.take_redirection(),
            Some(Redirection {
                operator: RedirectOp::Append,
                filename: "sorted.txt".to_string(),
            })
        );
        assert!(last.take_redirection().is_none());
    }

    #[test]
    fn test_argument_limit() {
        let at_limit = format!("echo {}", vec!["x"; MAX_ARGS - 1].join(" "));
        assert!(Parser::new(&at_limit).parse_pipeline().is_ok());

        let over_limit = format!("echo {}", vec!["x"; MAX_ARGS].join(" "));
        assert_eq!(
            Parser::new(&over_limit).parse_pipeline(),
            Err(ParseError::TooManyArguments)
        );
    }

    #[test]
    fn test_too_many_arguments_aborts_whole_pipeline() {
        let line = format!("ls | echo {} | wc", vec!["x"; MAX_ARGS].join(" "));
        assert_eq!(
            Parser::new(&line).parse_pipeline(),
            Err(ParseError::TooManyArguments)
        );
    }

    #[test]
    fn test_empty_stage() {
        assert_eq!(
            Parser::new("ls || wc").parse_pipeline(),
            Err(ParseError::MissingCommand)
        );
        assert_eq!(
            Parser::new("ls | > out").parse_pipeline(),
            Err(ParseError::MissingCommand)
        );
    }

    #[test]
    fn test_validation_runs_first() {
        assert_eq!(
            Parser::new("echo hi > out.txt | cat").parse_pipeline(),
            Err(ParseError::MislocatedRedirection)
        );
        assert_eq!(
            Parser::new("echo hi >").parse_pipeline(),
            Err(ParseError::NoOutputFile)
        );
    }
}
