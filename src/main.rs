use chrono::Local;
use clap::Parser;
use std::path::Path;
use std::process::ExitCode;

use sns_postgen::cli::Args;
use sns_postgen::config::Config;
use sns_postgen::errors::PipelineError;
use sns_postgen::log::ArtifactSink;
use sns_postgen::pipeline::{Generation, Pipeline};
use sns_postgen::session::Session;
use sns_postgen::wire::GenerationRequest;
use sns_postgen::{prompt, provider, ux};

async fn submit(pipeline: &Pipeline, req: &GenerationRequest) -> Result<Generation, PipelineError> {
    // ===== STEP 1: TONE =====
    let pb = ux::spinner("Analysing tone & manner...");
    let tone = pipeline.analyze_tone(req).await;
    pb.finish_and_clear();
    let tone = tone?;

    // ===== STEP 2: POSTS =====
    let pb = ux::spinner("Drafting posts...");
    let batch = pipeline.generate_posts(req, &tone).await;
    pb.finish_and_clear();
    let batch = batch?;

    let warnings = pipeline.limit_warnings(req, &batch);
    Ok(Generation { tone, batch, warnings })
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    let mut cfg = Config::load(args.config.as_deref().map(Path::new))?;
    cfg.apply_args(&args);

    // Fails here, before any input is read, when the API key is missing.
    let prov = provider::make_provider(cfg.provider, cfg.api_base.clone())?;
    if args.debug {
        println!("debug: provider={} model={} variant={:?}", prov.name(), cfg.model, cfg.variant);
    }

    let sink = ArtifactSink::new(&cfg.artifacts_dir, cfg.save_request, cfg.save_response);
    if args.debug && sink.enabled() {
        println!("debug: planned artifacts directory: {}", sink.run_dir().display());
    }
    let pipeline = Pipeline::new(prov, cfg.clone())
        .with_artifacts(sink)
        .with_debug(args.debug);

    let mut session = Session::new();
    let mut url = args.url.clone();

    loop {
        let account = match url.clone().or_else(|| ux::ask("Social media account URL")) {
            Some(u) => u,
            None => {
                ux::show_error(&PipelineError::Validation("please enter the social media account URL".into()));
                break;
            }
        };

        let req = match args.build_request(cfg.variant, &account, Local::now().date_naive()) {
            Ok(r) => r,
            Err(e) => {
                ux::show_error(&e);
                if args.interactive {
                    url = None;
                    continue;
                }
                return Ok(ExitCode::FAILURE);
            }
        };
        url = Some(account);

        ux::show_request(&req);
        let outcome = submit(&pipeline, &req).await;
        if let Some(e) = session.record(outcome) {
            ux::show_error(&e);
        }

        if let Some(latest) = session.latest() {
            ux::show_tone(&latest.tone);
            ux::show_batch(&latest.batch, prompt::character_limit(req.platform(), req.variant()));
            ux::show_warnings(&latest.warnings);
        }

        if !args.interactive || !ux::confirm("Generate again?") {
            break;
        }
    }

    println!("Review generated content before publishing.");
    Ok(if session.latest().is_some() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
