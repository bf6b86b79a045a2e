//! The template dispatcher.
//!
//! [`Dispatcher::dispatch`] is the single entry point for both kinds of invocation:
//!
//! - [`TemplateBody::Orchestrate`] validates the root mapping, then for each
//!   artifact descriptor renders the output path, opens a sink, derives a new
//!   mapping and re-enters `dispatch` with the artifact's terminal body.
//! - [`TemplateBody::EmitDeclaration`] / [`TemplateBody::EmitDefinition`] write the
//!   artifact text into the given sink and return.
//!
//! Recursion is one level deep: the orchestrator only ever recurses into terminal
//! bodies. Sink failures are recorded per artifact in the [`GenerationReport`] and
//! never stop sibling artifacts; invalid parameters and naming failures abort the
//! whole invocation before anything is written.

use std::error::Error;
use std::path::{Path, PathBuf};

use crate::artifacts::{
    ArtifactDescriptor, ArtifactStatus, GenerationReport, BACKEND_ARTIFACTS,
};
use crate::emit::{self, DeclarationParams, DefinitionParams};
use crate::error::{Result, TegelError};
use crate::naming::ArtifactNaming;
use crate::params::{BackendRequest, ParamValue, Params};
use crate::sink::{OutputSink, SinkOpen, SinkProvider};

/// Which routine a dispatcher invocation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateBody {
    /// Root invocation: fan out into one terminal invocation per artifact.
    Orchestrate,
    EmitDeclaration,
    EmitDefinition,
}

impl TemplateBody {
    /// Template-body identifier, as used in logs.
    pub fn id(&self) -> &'static str {
        match self {
            Self::Orchestrate => "",
            Self::EmitDeclaration | Self::EmitDefinition => "backend-file.tgl",
        }
    }
}

/// Counts bytes on their way to the wrapped sink.
struct Counting<'a> {
    inner: &'a mut dyn OutputSink,
    bytes: u64,
}

impl OutputSink for Counting<'_> {
    fn append(&mut self, text: &str) -> Result<()> {
        self.inner.append(text)?;
        self.bytes += text.len() as u64;
        Ok(())
    }
}

/// Sink handed to the root invocation, which never writes.
struct Discard;

impl OutputSink for Discard {
    fn append(&mut self, _text: &str) -> Result<()> {
        Ok(())
    }
}

/// Expands parameter mappings into artifacts opened through `P`.
pub struct Dispatcher<P: SinkProvider> {
    provider: P,
    naming: ArtifactNaming,
}

impl<P: SinkProvider> Dispatcher<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            naming: ArtifactNaming::new(),
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn into_provider(self) -> P {
        self.provider
    }

    /// Root invocation: generate every artifact of a backend skeleton.
    pub fn generate(&mut self, params: &Params) -> Result<GenerationReport> {
        self.dispatch(params, TemplateBody::Orchestrate, &mut Discard)
    }

    /// Run `body` against `params`.
    ///
    /// Terminal bodies write into `sink` and return an empty report; the root body
    /// ignores `sink` and opens its own per artifact.
    pub fn dispatch(
        &mut self,
        params: &Params,
        body: TemplateBody,
        sink: &mut dyn OutputSink,
    ) -> Result<GenerationReport> {
        match body {
            TemplateBody::Orchestrate => self.orchestrate(params),
            TemplateBody::EmitDeclaration => {
                emit::emit_declaration(&DeclarationParams::from_params(params)?, sink)?;
                Ok(GenerationReport::default())
            }
            TemplateBody::EmitDefinition => {
                emit::emit_definition(&DefinitionParams::from_params(params)?, sink)?;
                Ok(GenerationReport::default())
            }
        }
    }

    fn orchestrate(&mut self, params: &Params) -> Result<GenerationReport> {
        let request = BackendRequest::from_params(params)?;
        request.validate()?;
        tracing::info!(
            "generating backend '{}' (ast_visitor={}, {} nodes)",
            request.name,
            request.ast_visitor,
            request.nodes.len()
        );
        let root = request.into_params()?;

        // Resolve every name before opening anything, so a bad template or
        // parameter cannot leave a half-generated skeleton behind.
        let planned = BACKEND_ARTIFACTS
            .iter()
            .map(|descriptor| -> Result<_> {
                let path = PathBuf::from(self.naming.render(descriptor.file_name, &root)?);
                let derived = self.derive(descriptor, &root)?;
                Ok((descriptor, path, derived))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut report = GenerationReport::default();
        for (descriptor, path, derived) in planned {
            let status = self.generate_artifact(descriptor, &path, &derived);
            report.push(descriptor.kind, path, status);
        }
        Ok(report)
    }

    fn derive(&self, descriptor: &ArtifactDescriptor, params: &Params) -> Result<Params> {
        let overrides = descriptor
            .overrides
            .iter()
            .map(|(key, template)| -> Result<_> {
                let value = self.naming.render(template, params)?;
                Ok((key.to_string(), ParamValue::Str(value)))
            })
            .collect::<Result<Vec<_>>>()?;
        let derived = params.derive(descriptor.inherits, overrides);
        tracing::debug!(
            "derived {} parameters for {}: {:?}",
            descriptor.kind,
            descriptor.body.id(),
            derived.keys().collect::<Vec<_>>()
        );
        Ok(derived)
    }

    fn generate_artifact(
        &mut self,
        descriptor: &ArtifactDescriptor,
        path: &Path,
        derived: &Params,
    ) -> ArtifactStatus {
        let mut sink = match self.provider.open(path) {
            Ok(SinkOpen::Opened(sink)) => sink,
            Ok(SinkOpen::Declined) => {
                tracing::warn!("{} already exists, skipping", path.display());
                return ArtifactStatus::Skipped;
            }
            Err(e) => {
                tracing::error!("can't create {}: {}", path.display(), error_chain(&e));
                return ArtifactStatus::Failed(error_chain(&e));
            }
        };

        let mut counting = Counting {
            inner: &mut sink,
            bytes: 0,
        };
        let emitted = self.dispatch(derived, descriptor.body, &mut counting);
        let bytes = counting.bytes;
        // Released on every path, including a failed emission.
        let released = self.provider.release(sink);

        match emitted.and(released) {
            Ok(_) => {
                tracing::info!("wrote {} ({bytes} bytes)", path.display());
                ArtifactStatus::Written { bytes }
            }
            Err(e) => {
                tracing::error!("failed writing {}: {}", path.display(), error_chain(&e));
                ArtifactStatus::Failed(error_chain(&e))
            }
        }
    }
}

/// Render an error with its sources, `outer: inner: ...`.
fn error_chain(err: &TegelError) -> String {
    let mut msg = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        msg.push_str(": ");
        msg.push_str(&cause.to_string());
        source = cause.source();
    }
    msg
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::ArtifactKind;
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::sink::{FileSinkProvider, MemorySinkProvider, OverwritePolicy, OverwritePrompt};
    use crate::vocabulary;

    fn expr_params(ast_visitor: bool) -> Params {
        BackendRequest::new("expr")
            .with_ast_visitor(ast_visitor)
            .with_nodes(["Plus", "Minus"])
            .into_params()
            .unwrap()
    }

    #[test]
    fn test_template_body_ids() {
        assert_eq!(TemplateBody::Orchestrate.id(), "");
        assert_eq!(TemplateBody::EmitDeclaration.id(), "backend-file.tgl");
        assert_eq!(TemplateBody::EmitDefinition.id(), "backend-file.tgl");
    }

    #[test]
    fn test_generate_expr_scenario() {
        let mut dispatcher = Dispatcher::new(MemorySinkProvider::new());
        let report = dispatcher.generate(&expr_params(true)).unwrap();
        assert!(report.is_complete());

        let provider = dispatcher.into_provider();
        let hpp = provider.get("expr_backend.hpp").unwrap();
        let cpp = provider.get("expr_backend.cpp").unwrap();

        let body = hpp.find("class ExprBody").unwrap();
        let minus = hpp.find("visit(ast::Minus *)").unwrap();
        let plus = hpp.find("visit(ast::Plus *)").unwrap();
        assert!(body < minus && minus < plus);

        assert!(cpp.starts_with("#include \"expr_backend.hpp\"\n"));
        assert!(cpp.contains(
            "namespace expr_backend\n{\n    void ExprBody::visit(ast::Plus *)\n    {\n\n    }\n\n    void ExprBody::visit(ast::Minus *)\n"
        ));
    }

    #[test]
    fn test_report_records_paths_and_sizes() {
        let mut dispatcher = Dispatcher::new(MemorySinkProvider::new());
        let report = dispatcher.generate(&expr_params(false)).unwrap();
        let provider = dispatcher.provider();

        assert_eq!(report.artifacts.len(), 2);
        assert_eq!(report.artifacts[0].kind, ArtifactKind::Declaration);
        assert_eq!(report.artifacts[0].path, PathBuf::from("expr_backend.hpp"));
        assert_eq!(report.artifacts[1].kind, ArtifactKind::Definition);
        for outcome in &report.artifacts {
            let len = provider.get(&outcome.path).unwrap().len() as u64;
            assert_eq!(outcome.status, ArtifactStatus::Written { bytes: len });
        }
    }

    #[test]
    fn test_name_used_verbatim_in_path_lowercased_in_include() {
        let params = BackendRequest::new("Calc").into_params().unwrap();
        let mut dispatcher = Dispatcher::new(MemorySinkProvider::new());
        dispatcher.generate(&params).unwrap();
        let provider = dispatcher.into_provider();
        assert!(provider.get("Calc_backend.hpp").unwrap().contains("#ifndef __CALC_BACKEND_H__"));
        assert!(provider
            .get("Calc_backend.cpp")
            .unwrap()
            .starts_with("#include \"calc_backend.hpp\""));
    }

    #[test]
    fn test_custom_extensions() {
        let params = BackendRequest::new("expr")
            .with_extensions("hh", "cc")
            .into_params()
            .unwrap();
        let mut dispatcher = Dispatcher::new(MemorySinkProvider::new());
        dispatcher.generate(&params).unwrap();
        let provider = dispatcher.into_provider();
        assert!(provider
            .get("expr_backend.cc")
            .unwrap()
            .starts_with("#include \"expr_backend.hh\""));
        assert!(provider.get("expr_backend.hh").is_some());
    }

    #[test]
    fn test_declined_declaration_still_generates_definition() {
        let provider = MemorySinkProvider::new().decline("expr_backend.hpp");
        let mut dispatcher = Dispatcher::new(provider);
        let report = dispatcher.generate(&expr_params(true)).unwrap();

        assert!(report.is_partial());
        assert_eq!(report.artifacts[0].status, ArtifactStatus::Skipped);
        assert!(matches!(report.artifacts[1].status, ArtifactStatus::Written { .. }));
        let provider = dispatcher.into_provider();
        assert!(provider.get("expr_backend.hpp").is_none());
        assert!(provider.get("expr_backend.cpp").is_some());
    }

    #[test]
    fn test_unavailable_sink_is_not_fatal() {
        let provider = MemorySinkProvider::new().fail("expr_backend.hpp");
        let mut dispatcher = Dispatcher::new(provider);
        let report = dispatcher.generate(&expr_params(false)).unwrap();
        match &report.artifacts[0].status {
            ArtifactStatus::Failed(msg) => {
                assert!(msg.contains("cannot create expr_backend.hpp"));
                assert!(msg.contains("permission denied"));
            }
            other => panic!("expected failure, got {other:?}"),
        }
        assert!(matches!(report.artifacts[1].status, ArtifactStatus::Written { .. }));
    }

    struct FailingSink {
        budget: usize,
    }

    impl OutputSink for FailingSink {
        fn append(&mut self, text: &str) -> Result<()> {
            if text.len() > self.budget {
                return Err(TegelError::SinkWriteFailure {
                    path: PathBuf::from("full.hpp"),
                    source: std::io::Error::other("no space left on device"),
                });
            }
            self.budget -= text.len();
            Ok(())
        }
    }

    #[derive(Default)]
    struct FailingProvider {
        released: usize,
    }

    impl SinkProvider for FailingProvider {
        type Sink = FailingSink;

        fn open(&mut self, path: &Path) -> Result<SinkOpen<FailingSink>> {
            let budget = if path.extension().is_some_and(|e| e == "hpp") { 40 } else { usize::MAX };
            Ok(SinkOpen::Opened(FailingSink { budget }))
        }

        fn release(&mut self, _sink: FailingSink) -> Result<()> {
            self.released += 1;
            Ok(())
        }
    }

    #[test]
    fn test_write_failure_releases_sink_and_continues() {
        let mut dispatcher = Dispatcher::new(FailingProvider::default());
        let report = dispatcher.generate(&expr_params(true)).unwrap();

        assert!(matches!(report.artifacts[0].status, ArtifactStatus::Failed(ref m) if m.contains("no space left")));
        assert!(matches!(report.artifacts[1].status, ArtifactStatus::Written { .. }));
        // both sinks were handed back, including the one that failed
        assert_eq!(dispatcher.provider().released, 2);
    }

    #[test]
    fn test_invalid_name_fails_before_any_sink() {
        let params = Params::builder().set("name", "").build();
        let mut dispatcher = Dispatcher::new(MemorySinkProvider::new());
        let err = dispatcher.generate(&params).unwrap_err();
        assert!(matches!(err, TegelError::InvalidParameter { .. }));
        assert!(dispatcher.provider().artifacts().is_empty());
    }

    #[test]
    fn test_missing_name_is_invalid_parameter() {
        let mut dispatcher = Dispatcher::new(MemorySinkProvider::new());
        let err = dispatcher.generate(&Params::default()).unwrap_err();
        assert!(matches!(err, TegelError::InvalidParameter { ref name, .. } if name == "name"));
    }

    #[test]
    fn test_terminal_dispatch_writes_into_given_sink() {
        let params = Params::builder()
            .set("name", "expr")
            .set("ast_visitor", false)
            .set("nodes", Vec::<String>::new())
            .set("header", "expr_backend.hpp")
            .build();
        let mut dispatcher = Dispatcher::new(MemorySinkProvider::new());
        let mut out = String::new();
        let report = dispatcher
            .dispatch(&params, TemplateBody::EmitDefinition, &mut out)
            .unwrap();
        assert!(report.artifacts.is_empty());
        assert!(out.starts_with("#include \"expr_backend.hpp\"\n\n\nnamespace expr_backend\n"));
        assert!(dispatcher.provider().artifacts().is_empty());
    }

    #[test]
    fn test_generation_is_idempotent() {
        let params = BackendRequest::new("expr")
            .with_ast_visitor(true)
            .into_params()
            .unwrap();
        let run = || {
            let dir = tempfile::tempdir().unwrap();
            let provider =
                FileSinkProvider::create(dir.path(), Box::new(OverwritePolicy::Never)).unwrap();
            let mut dispatcher = Dispatcher::new(provider);
            assert!(dispatcher.generate(&params).unwrap().is_complete());
            (
                std::fs::read(dir.path().join("expr_backend.hpp")).unwrap(),
                std::fs::read(dir.path().join("expr_backend.cpp")).unwrap(),
            )
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_existing_files_skipped_under_never() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("expr_backend.hpp"), "hand edited").unwrap();
        let provider =
            FileSinkProvider::create(dir.path(), Box::new(OverwritePolicy::Never)).unwrap();
        let mut dispatcher = Dispatcher::new(provider);
        let report = dispatcher.generate(&expr_params(true)).unwrap();

        assert!(report.is_partial());
        assert_eq!(
            std::fs::read_to_string(dir.path().join("expr_backend.hpp")).unwrap(),
            "hand edited"
        );
        let cpp = std::fs::read_to_string(dir.path().join("expr_backend.cpp")).unwrap();
        assert!(cpp.contains("ExprBody::visit(ast::Minus *)"));
    }

    /// Answers per file name and remembers every question asked.
    struct ScriptedPrompt {
        answers: Vec<(&'static str, bool)>,
        asked: Rc<RefCell<Vec<PathBuf>>>,
    }

    impl OverwritePrompt for ScriptedPrompt {
        fn confirm_overwrite(&mut self, path: &Path) -> Result<bool> {
            self.asked.borrow_mut().push(path.to_path_buf());
            let file_name = path.file_name().and_then(|n| n.to_str());
            Ok(self
                .answers
                .iter()
                .any(|(name, yes)| *yes && file_name == Some(*name)))
        }
    }

    #[test]
    fn test_declined_declaration_accepted_definition() {
        let dir = tempfile::tempdir().unwrap();
        let hpp = dir.path().join("expr_backend.hpp");
        let cpp = dir.path().join("expr_backend.cpp");
        std::fs::write(&hpp, "// hand edited\n").unwrap();
        std::fs::write(&cpp, "// stale\n".repeat(2000)).unwrap();

        let asked = Rc::new(RefCell::new(Vec::new()));
        let prompt = ScriptedPrompt {
            answers: vec![("expr_backend.hpp", false), ("expr_backend.cpp", true)],
            asked: Rc::clone(&asked),
        };
        let provider = FileSinkProvider::create(dir.path(), Box::new(prompt)).unwrap();
        let mut dispatcher = Dispatcher::new(provider);
        let params = expr_params(true);
        let report = dispatcher.generate(&params).unwrap();

        assert!(report.is_partial());
        assert_eq!(report.artifacts[0].status, ArtifactStatus::Skipped);
        assert!(matches!(report.artifacts[1].status, ArtifactStatus::Written { .. }));
        assert_eq!(*asked.borrow(), vec![hpp.clone(), cpp.clone()]);

        assert_eq!(std::fs::read_to_string(&hpp).unwrap(), "// hand edited\n");

        let mut expected = Dispatcher::new(MemorySinkProvider::new());
        expected.generate(&params).unwrap();
        let expected = expected.into_provider();
        assert_eq!(
            std::fs::read_to_string(&cpp).unwrap(),
            expected.get("expr_backend.cpp").unwrap()
        );
    }

    #[test]
    fn test_default_vocabulary_counts() {
        let params = BackendRequest::new("expr")
            .with_ast_visitor(true)
            .into_params()
            .unwrap();
        let mut dispatcher = Dispatcher::new(MemorySinkProvider::new());
        dispatcher.generate(&params).unwrap();
        let provider = dispatcher.into_provider();
        let n = vocabulary::AST_NODES.len();
        assert_eq!(provider.get("expr_backend.hpp").unwrap().matches("virtual void visit(").count(), n);
        assert_eq!(provider.get("expr_backend.cpp").unwrap().matches("ExprBody::visit(").count(), n);
    }
}
