use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use spvsl_compiler::CompileParams;

fn main() {
    let action = Command::parse();

    if action.verbose {
        tracing_subscriber::fmt::Subscriber::builder()
            .without_time()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(std::io::stderr)
            .init();
    }

    let res = run(action.command, &mut std::io::stdout());

    match res {
        Ok(_) => {}
        Err(err) => {
            println!("{err}");
            std::process::exit(1);
        }
    }
}

#[derive(Parser)]
pub struct Command {
    #[clap(short, long)]
    pub verbose: bool,

    #[clap(subcommand)]
    pub command: Action,
}

#[derive(Subcommand)]
pub enum Action {
    /// Parse and check the source
    Check(SourceCommand),

    /// Print the checked expression
    Print(SourceCommand),

    /// Print the value of a constant expression
    Eval(SourceCommand),

    /// Compile the source to a SPIR-V module
    Compile(CompileCommand),
}

pub fn run(action: Action, out: &mut impl Write) -> anyhow::Result<()> {
    match action {
        Action::Check(cmd) => check(cmd, out),
        Action::Print(cmd) => print(cmd, out),
        Action::Eval(cmd) => eval(cmd, out),
        Action::Compile(cmd) => compile(cmd, out),
    }
}

#[derive(clap::Parser)]
pub struct SourceCommand {
    /// Global declarations followed by one expression
    file: PathBuf,
}

impl SourceCommand {
    fn parse(&self) -> anyhow::Result<spvsl_compiler::Program> {
        let source = std::fs::read_to_string(&self.file)?;
        tracing::debug!("read {} bytes from {}", source.len(), self.file.display());
        Ok(spvsl_compiler::parse(&source)?)
    }
}

pub fn check(cmd: SourceCommand, out: &mut impl Write) -> anyhow::Result<()> {
    let program = cmd.parse()?;

    let ty = program.expression.return_type();
    writeln!(out, "All good. Expression is of type {ty}.")?;
    Ok(())
}

pub fn print(cmd: SourceCommand, out: &mut impl Write) -> anyhow::Result<()> {
    let program = cmd.parse()?;

    writeln!(out, "{}", program.expression.print())?;
    Ok(())
}

pub fn eval(cmd: SourceCommand, out: &mut impl Write) -> anyhow::Result<()> {
    let program = cmd.parse()?;

    match program.expression.get_constant() {
        Some(value) => writeln!(out, "{value}")?,
        None => writeln!(out, "not constant")?,
    }
    Ok(())
}

#[derive(clap::Parser)]
pub struct CompileCommand {
    #[clap(flatten)]
    source: SourceCommand,

    #[clap(flatten)]
    compile: CompileParams,

    /// Output file. Defaults to the source file with extension `.spv`.
    #[clap(short, long)]
    output: Option<PathBuf>,

    /// Print the instructions instead of writing the module
    #[clap(long, default_value = "false")]
    disassemble: bool,
}

pub fn compile(cmd: CompileCommand, out: &mut impl Write) -> anyhow::Result<()> {
    let program = cmd.source.parse()?;

    let words = spvsl_compiler::compile(&program, cmd.compile);

    if cmd.disassemble {
        let (header, instructions) = spvsl_bin::spv::decode_module(&words)?;
        writeln!(out, "; SPIR-V {:#010x}, bound {}", header.version, header.bound)?;
        for instruction in instructions {
            writeln!(out, "{instruction}")?;
        }
        return Ok(());
    }

    let output = cmd
        .output
        .unwrap_or_else(|| cmd.source.file.with_extension("spv"));
    std::fs::write(&output, spvsl_bin::spv::words_to_bytes(&words))?;
    tracing::info!("wrote {} words to {}", words.len(), output.display());
    Ok(())
}

#[cfg(test)]
mod test {
    use clap::Parser;
    use insta::assert_snapshot;
    use spvsl_compiler::ExecutionModel;
    use temp_dir::TempDir;

    use super::{run, Action, Command};

    fn source_file(dir: &TempDir, source: &str) -> String {
        let path = dir.path().join("main.glsl");
        std::fs::write(&path, source).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[track_caller]
    fn _run(args: &[&str]) -> String {
        let command = Command::try_parse_from(["spvsl"].iter().chain(args)).unwrap();

        let mut out = Vec::new();
        run(command.command, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn source_commands() {
        let dir = TempDir::new().unwrap();
        let file = source_file(&dir, "const vec2 v = vec2(1.0, 2.0);\nv.yx * 2.0");

        assert_snapshot!(_run(&["check", &file]), @"All good. Expression is of type vec2.");
        assert_snapshot!(_run(&["print", &file]), @"v.yx * 2.0");
        assert_snapshot!(_run(&["eval", &file]), @"vec2(4.0, 2.0)");
    }

    #[test]
    fn disassemble() {
        let dir = TempDir::new().unwrap();
        let file = source_file(&dir, "float x; x * 2.0");

        assert_snapshot!(_run(&["compile", &file, "--strip-names", "--disassemble"]), @r"
        ; SPIR-V 0x00010000, bound 11
        OpCapability 1
        OpMemoryModel 0 1
        OpEntryPoint 5 9 1852399981 0
        OpExecutionMode 9 17 1 1 1
        OpTypeFloat 1 32
        OpTypePointer 2 6 1
        OpVariable 2 3 6
        OpConstant 1 5 1073741824
        OpTypeVoid 7
        OpTypeFunction 8 7
        OpFunction 7 9 0 8
        OpLabel 10
        OpLoad 1 4 3
        OpFMul 1 6 4 5
        OpReturn
        OpFunctionEnd
        ");
    }

    #[test]
    fn output_files() {
        let dir = TempDir::new().unwrap();
        let file = source_file(&dir, "float x; x * 2.0");

        // next to the source by default
        assert_eq!(_run(&["compile", &file]), "");
        let bytes = std::fs::read(dir.path().join("main.spv")).unwrap();
        assert_eq!(bytes[..4], 0x0723_0203u32.to_le_bytes());
        assert_eq!(bytes.len() % 4, 0);

        let output = dir.path().join("out.spv");
        let output = output.to_string_lossy();
        _run(&["compile", &file, "-o", &output, "--strip-names"]);
        let stripped = std::fs::read(&*output).unwrap();
        assert!(stripped.len() < bytes.len());
    }

    #[test]
    fn compile_params() {
        let command = Command::try_parse_from([
            "spvsl",
            "compile",
            "main.glsl",
            "--execution-model",
            "fragment",
            "--no-fold",
        ])
        .unwrap();

        let Action::Compile(cmd) = command.command else {
            panic!("expected compile");
        };
        assert_eq!(cmd.compile.execution_model, ExecutionModel::Fragment);
        assert!(cmd.compile.debug_names);
        assert!(!cmd.compile.fold_constants);
        assert_eq!(cmd.output, None);
    }
}
