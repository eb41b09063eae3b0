//! # Per-file Runner Unit Tests / 单文件运行器单元测试
//!
//! Tests sequential case execution and failure capture within one file, using
//! both the scripted in-process loader and the default manifest loader.
//!
//! 测试单个文件内的顺序用例执行和失败捕获。

mod common;

use common::{
    setup_test_directory, FileScript, ScriptedLoader, Step, BROKEN_MANIFEST, FAILING_MANIFEST,
    PASSING_MANIFEST,
};
use std::sync::Arc;
use std::time::Duration;
use suite_runner::core::file_test::FileTest;
use suite_runner::core::loader::ManifestLoader;

#[cfg(test)]
mod scripted_tests {
    use super::*;

    #[tokio::test]
    async fn test_cases_run_sequentially_in_declaration_order() {
        let loader = ScriptedLoader::new(vec![(
            "/t/a",
            FileScript::Cases(vec![
                ("first", Step::Sleep(Duration::from_millis(30))),
                ("second", Step::Pass),
                ("third", Step::Sleep(Duration::from_millis(5))),
            ]),
        )]);

        let report = FileTest::new("/t/a", Arc::new(loader.clone()))
            .run()
            .await
            .unwrap();

        let names: Vec<_> = report.cases.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second", "third"]);
        assert_eq!(
            loader.journal(),
            vec![
                "start /t/a::first",
                "end /t/a::first",
                "start /t/a::second",
                "end /t/a::second",
                "start /t/a::third",
                "end /t/a::third",
            ]
        );
        assert!(report.passed);
    }

    #[tokio::test]
    async fn test_failing_case_does_not_stop_siblings() {
        let loader = ScriptedLoader::new(vec![(
            "/t/b",
            FileScript::Cases(vec![
                ("ok", Step::Pass),
                ("bad", Step::Fail("expected 2, got 3")),
                ("after", Step::Pass),
            ]),
        )]);

        let report = FileTest::new("/t/b", Arc::new(loader)).run().await.unwrap();

        assert!(!report.passed);
        assert_eq!(report.cases.len(), 3);
        assert!(report.cases[0].passed);
        assert!(!report.cases[1].passed);
        assert_eq!(
            report.cases[1].error.as_ref().unwrap().message,
            "expected 2, got 3"
        );
        assert!(report.cases[2].passed);
    }

    #[tokio::test]
    async fn test_panicking_case_is_recorded_as_failure() {
        let loader = ScriptedLoader::new(vec![(
            "/t/c",
            FileScript::Cases(vec![("explodes", Step::Panic("kaboom")), ("after", Step::Pass)]),
        )]);

        let report = FileTest::new("/t/c", Arc::new(loader)).run().await.unwrap();

        assert!(!report.cases[0].passed);
        assert!(report.cases[0]
            .error
            .as_ref()
            .unwrap()
            .message
            .contains("kaboom"));
        assert!(report.cases[1].passed);
    }

    #[tokio::test]
    async fn test_load_error_propagates() {
        let loader = ScriptedLoader::new(vec![("/t/d", FileScript::LoadError("syntax error"))]);
        let err = FileTest::new("/t/d", Arc::new(loader)).run().await.unwrap_err();
        assert_eq!(err.to_string(), "syntax error");
    }

    #[tokio::test]
    async fn test_zero_cases_pass() {
        let loader = ScriptedLoader::new(vec![("/t/e", FileScript::Cases(vec![]))]);
        let report = FileTest::new("/t/e", Arc::new(loader)).run().await.unwrap();
        assert!(report.passed);
        assert!(report.is_empty());
    }
}

#[cfg(test)]
mod manifest_tests {
    use super::*;

    #[tokio::test]
    async fn test_passing_manifest() {
        let dir = setup_test_directory(&[("ok.test.toml", PASSING_MANIFEST)]);
        let report = FileTest::new(dir.path().join("ok.test.toml"), Arc::new(ManifestLoader))
            .run()
            .await
            .unwrap();

        assert!(report.passed);
        assert_eq!(report.cases.len(), 2);
        assert_eq!(report.cases[0].name, "true exits zero");
    }

    #[tokio::test]
    async fn test_failing_command_captures_output() {
        let dir = setup_test_directory(&[("bad.test.toml", FAILING_MANIFEST)]);
        let report = FileTest::new(dir.path().join("bad.test.toml"), Arc::new(ManifestLoader))
            .run()
            .await
            .unwrap();

        assert!(!report.passed);
        assert!(report.cases[0].passed);
        let error = report.cases[1].error.as_ref().unwrap();
        assert!(error.message.contains("exited with"));
        assert!(error.stack.as_ref().unwrap().contains("boom"));
    }

    #[tokio::test]
    async fn test_missing_program_is_a_case_failure() {
        let dir = setup_test_directory(&[(
            "missing.test.toml",
            r#"
[[cases]]
name = "no such program"
command = "this_command_definitely_does_not_exist_12345"
"#,
        )]);
        let report = FileTest::new(
            dir.path().join("missing.test.toml"),
            Arc::new(ManifestLoader),
        )
        .run()
        .await
        .unwrap();

        assert!(!report.passed);
        assert!(report.cases[0]
            .error
            .as_ref()
            .unwrap()
            .message
            .contains("Failed to run"));
    }

    #[tokio::test]
    async fn test_cwd_and_env_are_applied() {
        let dir = setup_test_directory(&[
            (
                "env.test.toml",
                r#"
[[cases]]
name = "sees env"
command = "sh -c 'printenv GREETING | grep -qx hello'"
env = { GREETING = "hello" }

[[cases]]
name = "runs in fixtures dir"
command = "test -f marker.txt"
cwd = "fixtures"
"#,
            ),
            ("fixtures/marker.txt", "x"),
        ]);

        let report = FileTest::new(dir.path().join("env.test.toml"), Arc::new(ManifestLoader))
            .run()
            .await
            .unwrap();
        assert!(report.passed, "{:?}", report);
    }

    #[tokio::test]
    async fn test_invalid_manifest_is_a_load_error() {
        let dir = setup_test_directory(&[("broken.test.toml", BROKEN_MANIFEST)]);
        let err = FileTest::new(dir.path().join("broken.test.toml"), Arc::new(ManifestLoader))
            .run()
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Failed to parse test file"));
    }

    #[tokio::test]
    async fn test_missing_file_is_a_load_error() {
        let dir = setup_test_directory(&[]);
        let err = FileTest::new(dir.path().join("gone.test.toml"), Arc::new(ManifestLoader))
            .run()
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read test file"));
    }

    #[tokio::test]
    async fn test_unparsable_command_is_a_load_error() {
        let dir = setup_test_directory(&[(
            "quote.test.toml",
            r#"
[[cases]]
name = "unbalanced"
command = "echo 'oops"
"#,
        )]);
        let err = FileTest::new(dir.path().join("quote.test.toml"), Arc::new(ManifestLoader))
            .run()
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("invalid command"));
    }
}
