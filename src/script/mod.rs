//! Rendering of the shell wrapper installed as the host's native hook script.

use std::path::Path;

const TEMPLATE: &str = include_str!("hook-script.template.sh");

/// Wrap `value` in single quotes so the shell passes it through untouched.
///
/// Embedded single quotes close the quoted string, emit a double-quoted
/// quote, and reopen it: `it's` becomes `'it'"'"'s'`.
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "'\"'\"'"))
}

/// Render the wrapper script invoking `executable` with `args`.
///
/// In async mode stdin is drained to a temporary file first and the real
/// invocation runs in a detached background subshell, so the wrapper exits
/// (successfully) right away and the host operation is never blocked.
pub fn render(executable: &Path, args: &[String], async_mode: bool) -> String {
    let mut script = String::with_capacity(TEMPLATE.len() + 256);
    script.push_str(TEMPLATE);
    script.push_str("\n\n");

    if async_mode {
        script.push_str("stdin=\"$(mktemp)\"\n");
        script.push_str("cat >\"$stdin\"\n");
        script.push_str("(\n");
        script.push_str("    trap \"rm \\\"$stdin\\\"\" EXIT\n");
        script.push_str("    ");
    }

    script.push_str(&shell_quote(&executable.to_string_lossy()));
    for arg in args {
        script.push(' ');
        script.push_str(&shell_quote(arg));
    }

    if async_mode {
        script.push_str(" <\"$stdin\"\n");
        script.push_str(") >/dev/null 2>&1 <&- &\n");
    }

    script.push('\n');
    script
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn quote_plain_value() {
        assert_eq!(shell_quote("hook.sh"), "'hook.sh'");
    }

    #[test]
    fn quote_escapes_single_quotes() {
        assert_eq!(shell_quote("it's"), r#"'it'"'"'s'"#);
    }

    #[test]
    fn quote_leaves_other_metacharacters_alone() {
        assert_eq!(shell_quote("$HOME `x` \"y\" \\z"), r#"'$HOME `x` "y" \z'"#);
    }

    #[test]
    fn render_starts_with_template() {
        let script = render(Path::new("/bin/true"), &[], false);
        assert!(script.starts_with("#!/bin/sh\n"));
        assert!(script.starts_with(TEMPLATE));
    }

    #[test]
    fn render_sync_invocation_line() {
        let args = vec!["--flag".to_string(), "two words".to_string()];
        let script = render(Path::new("/opt/hooks/check"), &args, false);
        assert!(script.ends_with("\n\n'/opt/hooks/check' '--flag' 'two words'\n"));
        assert!(!script.contains("mktemp"));
    }

    #[test]
    fn render_async_backgrounds_the_invocation() {
        let script = render(&PathBuf::from("/opt/hooks/notify"), &["x".to_string()], true);
        let body = &script[TEMPLATE.len()..];
        assert_eq!(
            body,
            "\n\nstdin=\"$(mktemp)\"\n\
             cat >\"$stdin\"\n\
             (\n    trap \"rm \\\"$stdin\\\"\" EXIT\n    \
             '/opt/hooks/notify' 'x' <\"$stdin\"\n\
             ) >/dev/null 2>&1 <&- &\n\n"
        );
    }

    #[cfg(unix)]
    mod shell {
        use super::*;
        use std::fs;
        use std::process::{Command, Stdio};
        use std::time::{Duration, Instant};
        use tempfile::TempDir;

        /// Render a script that runs `/bin/sh <helper> <args>` and execute it with `sh`.
        fn run_rendered(
            dir: &TempDir,
            helper_body: &str,
            args: &[&str],
            async_mode: bool,
        ) -> Vec<u8> {
            let helper = dir.path().join("helper.sh");
            fs::write(&helper, helper_body).unwrap();

            let mut argv = vec![helper.to_string_lossy().into_owned()];
            argv.extend(args.iter().map(|a| a.to_string()));
            let script = render(Path::new("/bin/sh"), &argv, async_mode);
            let script_path = dir.path().join("wrapper.sh");
            fs::write(&script_path, script).unwrap();

            let output = Command::new("/bin/sh")
                .arg(&script_path)
                .current_dir(dir.path())
                .stdin(Stdio::null())
                .output()
                .unwrap();
            assert!(output.status.success());
            output.stdout
        }

        #[test]
        fn arguments_round_trip_through_the_shell() {
            let dir = TempDir::new().unwrap();
            let args = [
                "plain",
                "two words",
                "it's",
                "''",
                r#""double""#,
                r"back\slash",
                "$HOME",
                "`id`",
                "; rm -rf / #",
                "*",
                "tab\there",
                "new\nline",
            ];
            let stdout = run_rendered(
                &dir,
                "for a in \"$@\"; do printf '%s\\0' \"$a\"; done\n",
                &args,
                false,
            );

            let received: Vec<String> = stdout
                .split(|b| *b == 0)
                .filter(|s| !s.is_empty())
                .map(|s| String::from_utf8(s.to_vec()).unwrap())
                .collect();
            assert_eq!(received, args);
        }

        #[test]
        fn async_wrapper_returns_and_still_delivers_stdin() {
            let dir = TempDir::new().unwrap();
            let out = dir.path().join("received");
            let helper = dir.path().join("helper.sh");
            fs::write(&helper, format!("cat > '{}.tmp' && mv '{0}.tmp' '{0}'\n", out.display()))
                .unwrap();

            let script = render(
                Path::new("/bin/sh"),
                &[helper.to_string_lossy().into_owned()],
                true,
            );
            let script_path = dir.path().join("wrapper.sh");
            fs::write(&script_path, script).unwrap();

            let mut child = Command::new("/bin/sh")
                .arg(&script_path)
                .stdin(Stdio::piped())
                .stdout(Stdio::null())
                .spawn()
                .unwrap();
            {
                use std::io::Write;
                let mut stdin = child.stdin.take().unwrap();
                stdin.write_all(b"a b refs/heads/master\n").unwrap();
            }
            assert!(child.wait().unwrap().success());

            let deadline = Instant::now() + Duration::from_secs(10);
            while !out.exists() && Instant::now() < deadline {
                std::thread::sleep(Duration::from_millis(20));
            }
            assert_eq!(fs::read_to_string(&out).unwrap(), "a b refs/heads/master\n");
        }
    }
}
