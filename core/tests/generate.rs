use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;
use tsbarrels_core::{
    Config, DirectoryReport, EXIT_FATAL, EXIT_PARTIAL_FAILURE, EXIT_SUCCESS, ExportStyle,
    GenerationOptions, Generator, IssueKind, Outcome, Reporter, SilentReporter, SkipReason,
};

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn read(root: &Path, rel: &str) -> String {
    fs::read_to_string(root.join(rel)).unwrap()
}

fn options(recursive: bool, force: bool) -> GenerationOptions {
    GenerationOptions {
        recursive,
        force,
        ..GenerationOptions::default()
    }
}

fn run(root: &Path, options: GenerationOptions) -> tsbarrels_core::GenerationSummary {
    Generator::new(Config::default(), options)
        .run(root, &SilentReporter)
        .unwrap()
}

#[derive(Default)]
struct Recorder {
    started: Mutex<Vec<PathBuf>>,
    finished: Mutex<Vec<PathBuf>>,
}

impl Reporter for Recorder {
    fn report_progress(&self, directory: &Path) {
        self.started.lock().unwrap().push(directory.to_path_buf());
    }

    fn report_result(&self, report: &DirectoryReport) {
        self.finished.lock().unwrap().push(report.directory.clone());
    }
}

fn sample_tree(root: &Path) {
    write(root, "app.ts", "export const app = 1;\n");
    write(root, "a/alpha.ts", "export function alpha() {}\n");
    write(root, "a/b/beta.tsx", "export default function Beta() { return null; }\n");
    write(root, "a/b/types.ts", "export interface Props { id: string }\n");
}

#[test]
fn forced_runs_are_idempotent() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    sample_tree(root);

    run(root, options(true, true));
    let first = (read(root, "index.ts"), read(root, "a/index.ts"), read(root, "a/b/index.ts"));
    let summary = run(root, options(true, true));
    let second = (read(root, "index.ts"), read(root, "a/index.ts"), read(root, "a/b/index.ts"));

    assert_eq!(first, second);
    assert_eq!(summary.written().count(), 3);
    assert_eq!(summary.exit_code(), EXIT_SUCCESS);
}

#[test]
fn barrels_cover_every_exporting_child() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    sample_tree(root);

    let mut config = Config::default();
    config.output.style = ExportStyle::Named;
    Generator::new(config, options(true, false))
        .run(root, &SilentReporter)
        .unwrap();

    assert_eq!(
        read(root, "a/b/index.ts"),
        "export { default as Beta } from './beta';\n\
         export type { Props } from './types';\n"
    );
    assert_eq!(
        read(root, "a/index.ts"),
        "export { alpha } from './alpha';\n\
         export { Beta } from './b';\n\
         export type { Props } from './b';\n"
    );
    assert_eq!(
        read(root, "index.ts"),
        "export { app } from './app';\n\
         export { alpha, Beta } from './a';\n\
         export type { Props } from './a';\n"
    );
}

#[test]
fn existing_barrels_are_skipped_without_force() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "a.ts", "export const a = 1;\n");
    write(root, "index.ts", "// hand written\n");

    let summary = run(root, options(false, false));
    assert_eq!(read(root, "index.ts"), "// hand written\n");
    assert_eq!(
        summary.directories[0].outcome,
        Outcome::Skipped(SkipReason::Exists)
    );
    assert_eq!(summary.exit_code(), EXIT_SUCCESS);

    fs::write(root.join("index.ts"), "export * from './a';\n").unwrap();
    let summary = run(root, options(false, false));
    assert_eq!(
        summary.directories[0].outcome,
        Outcome::Skipped(SkipReason::UpToDate)
    );
}

#[test]
fn force_overwrites_existing_barrels() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "a.ts", "export const a = 1;\n");
    write(root, "index.ts", "// hand written\n");

    let summary = run(root, options(false, true));
    assert_eq!(read(root, "index.ts"), "export * from './a';\n");
    assert_eq!(summary.directories[0].outcome, Outcome::Written);
}

#[test]
fn children_are_processed_before_parents() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    sample_tree(root);
    write(root, "c/gamma.ts", "export const gamma = 1;\n");

    let recorder = Recorder::default();
    let summary = Generator::new(Config::default(), options(true, false))
        .run(root, &recorder)
        .unwrap();

    let finished = recorder.finished.lock().unwrap().clone();
    let position = |dir: PathBuf| finished.iter().position(|p| *p == dir).unwrap();
    assert!(position(root.join("a/b")) < position(root.join("a")));
    assert!(position(root.join("a")) < position(root.to_path_buf()));
    assert!(position(root.join("c")) < position(root.to_path_buf()));
    assert_eq!(finished.last().unwrap(), root);
    assert_eq!(recorder.started.lock().unwrap().len(), 4);

    let reported: Vec<PathBuf> = summary.directories.iter().map(|r| r.directory.clone()).collect();
    assert_eq!(reported, finished);
}

#[test]
fn malformed_modules_are_isolated() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "a.ts", "export const a = 1;\n");
    write(root, "b.ts", "export const b = 2;\n");
    write(root, "c.ts", "export const = ;\n");
    write(root, "d.ts", "export const d = 4;\n");
    write(root, "e.ts", "export const e = 5;\n");

    let summary = run(root, options(false, false));
    assert_eq!(
        read(root, "index.ts"),
        "export * from './a';\n\
         export * from './b';\n\
         export * from './d';\n\
         export * from './e';\n"
    );
    let report = &summary.directories[0];
    assert_eq!(report.outcome, Outcome::Written);
    let parse_issues: Vec<_> = report
        .issues
        .iter()
        .filter(|i| i.kind == IssueKind::Parse)
        .collect();
    assert_eq!(parse_issues.len(), 1);
    assert_eq!(parse_issues[0].path, root.join("c.ts"));
    assert_eq!(summary.exit_code(), EXIT_PARTIAL_FAILURE);
}

#[test]
fn custom_barrel_name() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "a.ts", "export const a = 1;\n");
    write(root, "b.ts", "export const b = 2;\n");

    let summary = run(
        root,
        GenerationOptions {
            barrel_name: "barrel.ts".to_string(),
            ..GenerationOptions::default()
        },
    );
    assert_eq!(
        read(root, "barrel.ts"),
        "export * from './a';\nexport * from './b';\n"
    );
    assert!(!root.join("index.ts").exists());
    assert_eq!(summary.directories[0].barrel, root.join("barrel.ts"));
}

#[test]
fn colliding_names_keep_the_first_module() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "a.ts", "export const shared = 1;\nexport const a = 1;\n");
    write(root, "b.ts", "export const shared = 2;\nexport const b = 2;\n");

    let summary = run(root, options(false, false));
    assert_eq!(
        read(root, "index.ts"),
        "export * from './a';\nexport { b } from './b';\n"
    );
    assert_eq!(summary.warning_count(), 1);
    assert_eq!(summary.exit_code(), EXIT_SUCCESS);
}

#[test]
fn excluded_and_declaration_files_are_ignored() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "a.ts", "export const a = 1;\n");
    write(root, "a.test.ts", "export const t = 1;\n");
    write(root, "globals.d.ts", "export declare const g: number;\n");
    write(root, "legacy/old.ts", "export const old = 1;\n");

    let mut config = Config::default();
    config.scan.exclude.push("legacy/".to_string());
    Generator::new(config, options(true, false))
        .run(root, &SilentReporter)
        .unwrap();

    assert_eq!(read(root, "index.ts"), "export * from './a';\n");
    assert!(!root.join("legacy/index.ts").exists());
}

#[test]
fn anonymous_default_clashing_with_a_named_export_is_warned() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(
        root,
        "Panel.ts",
        "export const Panel = 1;\nexport default function () { return 2; }\n",
    );

    let summary = run(root, options(false, false));
    assert_eq!(read(root, "index.ts"), "export * from './Panel';\n");
    assert_eq!(summary.warning_count(), 1);
    assert_eq!(summary.issues().next().unwrap().kind, IssueKind::Collision);
}

#[test]
fn directory_shadowed_by_a_sibling_module_uses_its_barrel_path() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "ui.ts", "export const theme = 1;\n");
    write(root, "ui/button.ts", "export const button = 1;\n");

    let summary = run(root, options(true, false));
    assert_eq!(
        read(root, "index.ts"),
        "export * from './ui';\nexport * from './ui/index';\n"
    );
    assert_eq!(summary.exit_code(), EXIT_SUCCESS);
}

#[test]
fn unwritable_root_barrel_is_fatal() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "a.ts", "export const a = 1;\n");
    fs::create_dir(root.join("index.ts")).unwrap();

    let summary = run(root, options(false, true));
    let report = summary.report_for(root).unwrap();
    assert!(matches!(report.outcome, Outcome::Failed(_)));
    assert!(report.issues.iter().any(|i| i.kind == IssueKind::Write));
    assert_eq!(summary.exit_code(), EXIT_FATAL);
}

#[cfg(unix)]
#[test]
fn unreadable_entries_do_not_stop_the_run() {
    use std::os::unix::fs::PermissionsExt;

    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "a.ts", "export const a = 1;\n");
    write(root, "secret.ts", "export const s = 1;\n");
    write(root, "locked/x.ts", "export const x = 1;\n");
    let locked = root.join("locked");
    let secret = root.join("secret.ts");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
    fs::set_permissions(&secret, fs::Permissions::from_mode(0o000)).unwrap();

    // Permission bits do not apply to a privileged user.
    if fs::read_dir(&locked).is_ok() {
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let summary = run(root, options(true, false));
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
    fs::set_permissions(&secret, fs::Permissions::from_mode(0o644)).unwrap();

    assert_eq!(read(root, "index.ts"), "export * from './a';\n");
    let locked_report = summary.report_for(&locked).unwrap();
    assert!(matches!(locked_report.outcome, Outcome::Failed(_)));
    assert_eq!(locked_report.issues[0].kind, IssueKind::Permission);

    let root_report = summary.report_for(root).unwrap();
    assert_eq!(root_report.outcome, Outcome::Written);
    assert!(
        root_report
            .issues
            .iter()
            .any(|i| i.kind == IssueKind::Permission && i.path == secret)
    );
    assert_eq!(summary.exit_code(), EXIT_PARTIAL_FAILURE);
}
