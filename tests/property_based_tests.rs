//! Property-Based Tests for Segment Labelling
//!
//! Pipeline labels and segment accounting must hold for any command list,
//! not just the handful of examples in the unit tests.

use proptest::prelude::*;
use redis_apm::pool::testing::{MockError, MockPool};
use redis_apm::{
    Command, InMemoryRecorder, InstrumentedPool, Network, Transaction, Value, pipeline_operation,
    pipeline_query,
};
use std::sync::Arc;

// Strategy for command names
fn command_name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Z]{1,10}").unwrap()
}

// Strategy for arguments; no spaces so renderings can be split back apart
fn argument_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z0-9:_]{1,16}").unwrap()
}

fn command_strategy() -> impl Strategy<Value = Command> {
    (
        command_name_strategy(),
        prop::collection::vec(argument_strategy(), 0..4),
    )
        .prop_map(|(name, args)| Command::with_args(name, args))
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime")
}

proptest! {
    #[test]
    fn pipeline_operation_lists_names_in_order(
        commands in prop::collection::vec(command_strategy(), 1..8)
    ) {
        let operation = pipeline_operation(&commands);
        let names: Vec<&str> = operation
            .strip_prefix("pipeline: ")
            .expect("prefix")
            .split(", ")
            .collect();

        prop_assert_eq!(names.len(), commands.len());
        for (name, command) in names.iter().zip(&commands) {
            prop_assert_eq!(*name, command.name());
        }
    }

    #[test]
    fn pipeline_query_renders_each_command(
        commands in prop::collection::vec(command_strategy(), 1..8)
    ) {
        let query = pipeline_query(&commands);
        let parts: Vec<&str> = query.split("; ").collect();

        prop_assert_eq!(parts.len(), commands.len());
        for (part, command) in parts.iter().zip(&commands) {
            let mut words = part.split(' ');
            prop_assert_eq!(words.next(), Some(command.name()));
            let args: Vec<&str> = words.collect();
            let expected: Vec<&str> = command.args().iter().map(String::as_str).collect();
            prop_assert_eq!(args, expected);
        }
    }

    #[test]
    fn one_segment_per_call_regardless_of_outcome(
        commands in prop::collection::vec(command_strategy(), 1..6),
        fail in any::<bool>(),
    ) {
        let recorder = Arc::new(InMemoryRecorder::new());
        let txn = Transaction::with_recorder("prop", recorder.clone());
        let mock = MockPool::new();
        if fail {
            mock.push_err(MockError::Injected("boom".to_string()));
        } else {
            mock.push_ok(Value::Array(vec![Value::Okay; commands.len()]));
        }
        let pool = InstrumentedPool::from_pool(mock, Network::Tcp, "localhost:6379").unwrap();

        let result: Result<Vec<Value>, MockError> =
            runtime().block_on(pool.execute_pipeline(Some(&txn), &commands));

        prop_assert_eq!(result.is_err(), fail);
        prop_assert_eq!(recorder.started_count(), 1);
        prop_assert_eq!(recorder.ended_count(), 1);
        let ended = recorder.ended();
        prop_assert_eq!(&ended[0].0.operation, &pipeline_operation(&commands));
        prop_assert_eq!(&ended[0].0.parameterized_query, &pipeline_query(&commands));
    }

    #[test]
    fn single_command_operation_is_lowercased(command in command_strategy()) {
        let recorder = Arc::new(InMemoryRecorder::new());
        let txn = Transaction::with_recorder("prop", recorder.clone());
        let pool =
            InstrumentedPool::from_pool(MockPool::new(), Network::Tcp, "localhost:6379").unwrap();

        let result: Result<Value, MockError> =
            runtime().block_on(pool.execute_command(Some(&txn), &command));

        prop_assert!(result.is_ok());
        let ended = recorder.ended();
        prop_assert_eq!(&ended[0].0.operation, &command.name().to_lowercase());
        prop_assert_eq!(&ended[0].0.parameterized_query, &command.render());
    }
}
