use crate::config::Config;
use crate::errors::PipelineError;
use crate::extract;
use crate::log::{self, ArtifactSink};
use crate::posts;
use crate::prompt;
use crate::provider::DynProvider;
use crate::wire::{CompletionRequest, GenerationRequest, Message, PostBatch, ToneProfile};

/// Result of one submission: the tone that steered generation, the six
/// drafts, and advisory warnings (over-limit drafts).
#[derive(Debug, Clone)]
pub struct Generation {
    pub tone: ToneProfile,
    pub batch: PostBatch,
    pub warnings: Vec<String>,
}

/// Tone analysis followed by post generation. Holds no per-request state;
/// every call takes its inputs explicitly.
pub struct Pipeline {
    provider: DynProvider,
    config: Config,
    sink: Option<ArtifactSink>,
    debug: bool,
}

impl Pipeline {
    pub fn new(provider: DynProvider, config: Config) -> Self {
        Self { provider, config, sink: None, debug: false }
    }

    pub fn with_artifacts(mut self, sink: ArtifactSink) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn tone_request(&self, req: &GenerationRequest) -> CompletionRequest {
        let stage = &self.config.tone;
        CompletionRequest {
            model: self.config.model.clone(),
            messages: vec![
                Message::system(prompt::system_prompt_tone()),
                Message::user(prompt::user_prompt_tone(req, &self.config.language)),
            ],
            temperature: stage.temperature,
            max_tokens: stage.max_tokens,
            timeout: stage.timeout(),
        }
    }

    pub fn posts_request(&self, req: &GenerationRequest, tone: &ToneProfile) -> CompletionRequest {
        let stage = &self.config.generation;
        CompletionRequest {
            model: self.config.model.clone(),
            messages: vec![
                Message::system(prompt::system_prompt_posts()),
                Message::user(prompt::user_prompt_posts(req, &tone.description, &self.config.language)),
            ],
            temperature: stage.temperature,
            max_tokens: stage.max_tokens,
            timeout: stage.timeout(),
        }
    }

    pub async fn analyze_tone(&self, req: &GenerationRequest) -> Result<ToneProfile, PipelineError> {
        let call = self.tone_request(req);
        let reply = self
            .call("tone", &call)
            .await
            .map_err(|e| PipelineError::Analysis(format!("{e:#}")))?;
        let description = reply.trim().to_string();
        if description.is_empty() {
            return Err(PipelineError::Analysis("model returned an empty tone description".into()));
        }
        Ok(ToneProfile { description })
    }

    pub async fn generate_posts(
        &self,
        req: &GenerationRequest,
        tone: &ToneProfile,
    ) -> Result<PostBatch, PipelineError> {
        let call = self.posts_request(req, tone);
        let reply = self
            .call("posts", &call)
            .await
            .map_err(|e| PipelineError::Generation(format!("{e:#}")))?;

        let (strategy, value) = extract::extract_with_strategy(&reply)?;
        if self.debug {
            eprintln!("debug[posts]: payload taken from {}", strategy.name());
        }
        Ok(posts::parse_batch(value)?)
    }

    /// Both stages in sequence; the tone text is embedded in the second prompt.
    pub async fn run(&self, req: &GenerationRequest) -> Result<Generation, PipelineError> {
        let tone = self.analyze_tone(req).await?;
        let batch = self.generate_posts(req, &tone).await?;
        let warnings = self.limit_warnings(req, &batch);
        Ok(Generation { tone, batch, warnings })
    }

    /// The character limit is only advised to the model; drafts over it are
    /// reported, never truncated or rejected.
    pub fn limit_warnings(&self, req: &GenerationRequest, batch: &PostBatch) -> Vec<String> {
        let limit = prompt::character_limit(req.platform(), req.variant());
        posts::over_limit(batch, limit)
            .into_iter()
            .map(|i| {
                format!(
                    "post #{} is {} characters (limit {limit})",
                    i + 1,
                    batch.drafts()[i].char_count()
                )
            })
            .collect()
    }

    async fn call(&self, stage: &str, call: &CompletionRequest) -> anyhow::Result<String> {
        if self.debug {
            log::print_prompt_debug(stage, call);
        }
        let reply = self.provider.complete(call, self.debug).await?;
        if let Some(sink) = &self.sink {
            match sink.save_stage(stage, call, &reply) {
                Ok(saved) if self.debug => log::print_saved_paths(stage, &saved),
                Ok(_) => {}
                Err(e) => eprintln!("warning: could not save {stage} artifacts: {e:#}"),
            }
        }
        Ok(reply)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::errors::ShapeError;
    use crate::provider::Provider;
    use crate::wire::{Platform, Role, Variant};
    use anyhow::anyhow;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Replays canned replies in order and records every request it sees.
    pub(crate) struct Scripted {
        replies: Mutex<VecDeque<Result<String, String>>>,
        pub(crate) seen: Arc<Mutex<Vec<CompletionRequest>>>,
    }

    impl Scripted {
        pub(crate) fn new(replies: Vec<Result<&str, &str>>) -> Self {
            Self {
                replies: Mutex::new(
                    replies
                        .into_iter()
                        .map(|r| r.map(str::to_string).map_err(str::to_string))
                        .collect(),
                ),
                seen: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    #[async_trait]
    impl Provider for Scripted {
        async fn complete(&self, req: &CompletionRequest, _debug: bool) -> anyhow::Result<String> {
            self.seen.lock().unwrap().push(req.clone());
            match self.replies.lock().unwrap().pop_front() {
                Some(Ok(text)) => Ok(text),
                Some(Err(e)) => Err(anyhow!(e)),
                None => Err(anyhow!("no scripted reply left")),
            }
        }

        fn name(&self) -> &'static str {
            "scripted"
        }
    }

    pub(crate) fn six_posts_reply() -> String {
        let posts: Vec<serde_json::Value> = (1..=6)
            .map(|i| serde_json::json!({"title": format!("title {i}"), "content": format!("content {i}")}))
            .collect();
        format!(
            "Here are your posts:\n```json\n{}\n```\nGood luck!",
            serde_json::to_string_pretty(&posts).unwrap()
        )
    }

    fn brand_request(variant: Variant) -> GenerationRequest {
        let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        GenerationRequest::new(variant, "https://x.com/brand", Platform::X, None, date, None, date).unwrap()
    }

    fn pipeline(replies: Vec<Result<&str, &str>>) -> (Pipeline, Arc<Mutex<Vec<CompletionRequest>>>) {
        let scripted = Scripted::new(replies);
        let seen = scripted.seen.clone();
        (Pipeline::new(Box::new(scripted), Config::default()), seen)
    }

    #[tokio::test]
    async fn end_to_end_embeds_tone_and_returns_six_posts() {
        let tone = "Playful, emoji-heavy, short punchy lines";
        let reply = six_posts_reply();
        let (p, seen) = pipeline(vec![Ok(format!("  {tone}\n").as_str()), Ok(reply.as_str())]);

        let out = p.run(&brand_request(Variant::Generic)).await.unwrap();
        assert_eq!(out.tone.description, tone);
        assert_eq!(out.batch.len(), 6);
        assert!(out.batch.iter().all(|d| !d.title.is_empty() && !d.content.is_empty()));
        assert!(out.warnings.is_empty());

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        let tone_call = &seen[0];
        assert!(tone_call.user_text().unwrap().contains("https://x.com/brand"));
        assert_eq!(tone_call.max_tokens, 500);
        assert!((tone_call.temperature - 0.7).abs() < 1e-6);
        assert_eq!(tone_call.messages[0].role, Role::System);

        let gen_call = &seen[1];
        let gen_prompt = gen_call.user_text().unwrap();
        assert!(gen_prompt.contains(tone));
        assert!(gen_prompt.contains("Keep each post within 140 characters."));
        assert_eq!(gen_call.max_tokens, 2000);
        assert!((gen_call.temperature - 0.8).abs() < 1e-6);
        assert!(gen_call.timeout > tone_call.timeout);
    }

    #[tokio::test]
    async fn x_only_variant_advises_280() {
        let reply = six_posts_reply();
        let (p, seen) = pipeline(vec![Ok("calm"), Ok(reply.as_str())]);
        p.run(&brand_request(Variant::XOnly)).await.unwrap();
        let seen = seen.lock().unwrap();
        assert!(seen[0].user_text().unwrap().contains("150 characters"));
        assert!(seen[1].user_text().unwrap().contains("Keep each post within 280 characters."));
    }

    #[tokio::test]
    async fn transport_failure_is_an_analysis_error_and_stops() {
        let (p, seen) = pipeline(vec![Err("connection reset by peer")]);
        let err = p.run(&brand_request(Variant::Generic)).await.unwrap_err();
        match err {
            PipelineError::Analysis(msg) => assert!(msg.contains("connection reset")),
            other => panic!("unexpected {other}"),
        }
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn empty_tone_is_an_analysis_error() {
        let (p, _) = pipeline(vec![Ok("   ")]);
        assert!(matches!(
            p.analyze_tone(&brand_request(Variant::Generic)).await,
            Err(PipelineError::Analysis(_))
        ));
    }

    #[tokio::test]
    async fn object_payload_is_a_shape_error() {
        let (p, _) = pipeline(vec![Ok("tone"), Ok(r#"{"title":"a"}"#)]);
        let err = p.run(&brand_request(Variant::Generic)).await.unwrap_err();
        assert!(matches!(err, PipelineError::Shape(ShapeError::NotAList)));
        assert_eq!(err.to_string(), "result is not a list of posts");
    }

    #[tokio::test]
    async fn trailing_comma_is_a_format_error() {
        let (p, _) = pipeline(vec![Ok("tone"), Ok("```json\n[{\"title\":\"a\",}]\n```")]);
        match p.run(&brand_request(Variant::Generic)).await.unwrap_err() {
            PipelineError::Format(msg) => assert!(msg.contains("at line 1 column"), "{msg}"),
            other => panic!("unexpected {other}"),
        }
    }

    #[tokio::test]
    async fn stray_prose_brackets_do_not_mask_a_broken_fence() {
        let (p, _) = pipeline(vec![Ok("tone"), Ok("Step [1] done.\n```json\n[{\"title\":\"a\",}]\n```")]);
        match p.run(&brand_request(Variant::Generic)).await.unwrap_err() {
            PipelineError::Format(msg) => assert!(msg.contains("json fence"), "{msg}"),
            other => panic!("unexpected {other}"),
        }
    }

    #[tokio::test]
    async fn generation_transport_failure_is_a_generation_error() {
        let (p, _) = pipeline(vec![Ok("tone"), Err("504 gateway timeout")]);
        assert!(matches!(
            p.run(&brand_request(Variant::Generic)).await,
            Err(PipelineError::Generation(_))
        ));
    }

    #[tokio::test]
    async fn long_drafts_warn_but_do_not_fail() {
        let mut posts: Vec<serde_json::Value> = (1..=6)
            .map(|i| serde_json::json!({"title": format!("t{i}"), "content": "short"}))
            .collect();
        posts[2] = serde_json::json!({"title": "t3", "content": "x".repeat(150)});
        let reply = serde_json::to_string(&posts).unwrap();
        let (p, _) = pipeline(vec![Ok("tone"), Ok(reply.as_str())]);
        let out = p.run(&brand_request(Variant::Generic)).await.unwrap();
        assert_eq!(out.warnings, vec!["post #3 is 150 characters (limit 140)".to_string()]);
    }

    #[tokio::test]
    async fn artifacts_are_saved_per_stage() {
        let tmp = tempfile::tempdir().unwrap();
        let sink = ArtifactSink::new(tmp.path(), true, true);
        let dir = sink.run_dir();
        let reply = six_posts_reply();
        let scripted = Scripted::new(vec![Ok("tone"), Ok(reply.as_str())]);
        let p = Pipeline::new(Box::new(scripted), Config::default()).with_artifacts(sink);
        p.run(&brand_request(Variant::Generic)).await.unwrap();
        for f in ["tone.request.json", "tone.response.json", "posts.request.json", "posts.response.json"] {
            assert!(dir.join(f).exists(), "missing {f}");
        }
    }
}
