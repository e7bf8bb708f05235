//! Command descriptors
//!
//! A [`Command`] is the name and ordered string arguments of one Redis
//! command. The result destination is the type the caller asks
//! [`InstrumentedPool::execute_command`](crate::InstrumentedPool::execute_command)
//! to decode into.

use std::fmt;

/// One Redis command to execute
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Command {
    name: String,
    args: Vec<String>,
}

impl Command {
    /// Command with no arguments yet
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Command with the given arguments, in order
    pub fn with_args<I, S>(name: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Append an argument
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// `"<command> <args...>"`
    pub fn render(&self) -> String {
        let mut rendered = self.name.clone();
        for arg in &self.args {
            rendered.push(' ');
            rendered.push_str(arg);
        }
        rendered
    }

    /// Build the `redis` command action
    pub fn to_cmd(&self) -> redis::Cmd {
        let mut cmd = redis::cmd(&self.name);
        for arg in &self.args {
            cmd.arg(arg);
        }
        cmd
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Segment operation label for a pipeline: `"pipeline: "` + names joined by `", "`
pub fn pipeline_operation(commands: &[Command]) -> String {
    let names: Vec<&str> = commands.iter().map(Command::name).collect();
    format!("pipeline: {}", names.join(", "))
}

/// Segment query detail for a pipeline: renderings joined by `"; "`
pub fn pipeline_query(commands: &[Command]) -> String {
    let rendered: Vec<String> = commands.iter().map(Command::render).collect();
    rendered.join("; ")
}

/// Build one pipelined action, preserving command order
pub fn to_pipeline(commands: &[Command]) -> redis::Pipeline {
    let mut pipeline = redis::pipe();
    for command in commands {
        pipeline.add_command(command.to_cmd());
    }
    pipeline
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Command::with_args("SET", ["k", "v"]), "SET k v")]
    #[case(Command::new("GET").arg("k"), "GET k")]
    #[case(Command::new("PING"), "PING")]
    #[case(Command::with_args("HSET", ["h", "field one", "1"]), "HSET h field one 1")]
    fn test_render(#[case] command: Command, #[case] expected: &str) {
        assert_eq!(command.render(), expected);
        assert_eq!(command.to_string(), expected);
    }

    #[test]
    fn test_pipeline_labels() {
        let commands = vec![
            Command::with_args("SET", ["k", "v"]),
            Command::with_args("GET", ["k"]),
        ];

        assert_eq!(pipeline_operation(&commands), "pipeline: SET, GET");
        assert_eq!(pipeline_query(&commands), "SET k v; GET k");
    }

    #[test]
    fn test_empty_pipeline_labels() {
        assert_eq!(pipeline_operation(&[]), "pipeline: ");
        assert_eq!(pipeline_query(&[]), "");
    }

    #[test]
    fn test_to_cmd_packs_arguments() {
        let packed = Command::with_args("SET", ["k", "v"]).to_cmd().get_packed_command();
        assert_eq!(packed, b"*3\r\n$3\r\nSET\r\n$1\r\nk\r\n$1\r\nv\r\n".to_vec());
    }

    #[test]
    fn test_to_pipeline_preserves_order() {
        let commands = vec![Command::new("INCR").arg("a"), Command::new("DECR").arg("b")];
        let packed = to_pipeline(&commands).get_packed_pipeline();

        let expected = [
            Command::new("INCR").arg("a").to_cmd().get_packed_command(),
            Command::new("DECR").arg("b").to_cmd().get_packed_command(),
        ]
        .concat();
        assert_eq!(packed, expected);
    }
}
