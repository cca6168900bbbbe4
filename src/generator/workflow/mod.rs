use crate::config::Config;
use crate::generator::compose::{
    summarize_category, write_discussion_future_directions, write_discussion_intro,
    write_discussion_limitations, write_methods, write_results_intro, write_results_subsection,
};
use crate::generator::context::GeneratorContext;
use crate::generator::outlet::{self, PaperDraft, create_bibliography, render_article_listing};
use crate::generator::research::{categorize_articles, filter_articles, gather_articles};
use crate::generator::stage::Stage;
use crate::llm::client::LLMClient;
use crate::types::{ArticleRecord, CategoryMap};

use anyhow::Result;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::time::{Duration, Instant};

pub mod manifest;

pub use manifest::RunManifest;

/// 时间跟踪作用域
pub struct TimingScope {
    start_time: Instant,
    phase_start_times: HashMap<String, Instant>,
    phase_durations: Vec<(String, Duration)>,
}

impl Default for TimingScope {
    fn default() -> Self {
        Self::new()
    }
}

impl TimingScope {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            phase_start_times: HashMap::new(),
            phase_durations: Vec::new(),
        }
    }

    /// 开始一个新的阶段计时
    pub fn start_phase(&mut self, phase_name: &str) {
        self.phase_start_times
            .insert(phase_name.to_string(), Instant::now());
    }

    /// 结束一个阶段的计时
    pub fn end_phase(&mut self, phase_name: &str) -> Option<Duration> {
        let duration = self.phase_start_times.remove(phase_name)?.elapsed();
        self.phase_durations
            .push((phase_name.to_string(), duration));
        Some(duration)
    }

    /// 获取总执行时间
    pub fn get_total_duration(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// 获取格式化的执行时间报告
    pub fn generate_timing_report(&self) -> String {
        let mut report = format!(
            "总执行时间: {:.2}秒\n",
            self.get_total_duration().as_secs_f64()
        );

        if !self.phase_durations.is_empty() {
            report.push_str("各阶段执行时间:\n");
            for (phase, duration) in &self.phase_durations {
                report.push_str(&format!("- {}: {:.3}秒\n", phase, duration.as_secs_f64()));
            }
        }

        report
    }
}

/// 时间跟踪常量
pub struct TimingKeys;

impl TimingKeys {
    pub const SEARCH: &'static str = "search";
    pub const SCREENING: &'static str = "screening";
    pub const COMPOSE: &'static str = "compose";
    pub const OUTPUT: &'static str = "output";
}

/// 启动论文生成工作流
pub async fn launch(config: &Config) -> Result<()> {
    let llm_client = LLMClient::new(config.llm.clone())?;

    // 启动时检查模型连接
    llm_client.check_connection().await?;

    let context = GeneratorContext::with_llm_client(config.clone(), llm_client);
    let document_path = run_pipeline(&context).await?;

    tracing::info!("🎉 论文草稿已生成: {}", document_path.display());
    Ok(())
}

/// 按固定顺序执行全部阶段，返回 `main.tex` 的路径
///
/// 已有产物的阶段直接读取结果，不再调用模型或外部服务。
pub async fn run_pipeline(context: &GeneratorContext) -> Result<PathBuf> {
    let checkpointer = context.checkpointer.as_ref();
    let mut timing = TimingScope::new();

    if context.config.force_regenerate {
        tracing::info!("🧹 强制重新生成，清空暂存目录");
        checkpointer.clear().await?;
    }
    RunManifest::ensure(checkpointer, context.topic()).await?;
    tracing::info!("🚀 开始撰写: {}", context.topic());

    // 检索
    timing.start_phase(TimingKeys::SEARCH);
    let (queries, articles) = collect_articles(context).await?;
    timing.end_phase(TimingKeys::SEARCH);

    // 筛选
    timing.start_phase(TimingKeys::SCREENING);
    let accepted: Vec<ArticleRecord> = Stage::abstract_filtered()
        .run_json(checkpointer, || filter_articles(context, &articles))
        .await?;
    Stage::article_listing()
        .run_text(checkpointer, || async {
            Ok::<_, anyhow::Error>(render_article_listing(&accepted))
        })
        .await?;
    let bibliography = Stage::bibliography()
        .run_text(checkpointer, || async {
            Ok::<_, anyhow::Error>(create_bibliography(&accepted))
        })
        .await?;
    timing.end_phase(TimingKeys::SCREENING);

    // 撰写
    timing.start_phase(TimingKeys::COMPOSE);
    let methods = Stage::methods()
        .run_text(checkpointer, || write_methods(context, &queries, &accepted))
        .await?;

    let categories: CategoryMap = Stage::categories()
        .run_json(checkpointer, || categorize_articles(context, &accepted))
        .await?;
    // 读取的旧产物同样需要满足序号约束
    categories.validate(accepted.len())?;

    let mut category_summaries = Vec::with_capacity(categories.len());
    for (index, category) in categories.iter().enumerate() {
        let summaries: BTreeMap<usize, String> = Stage::subsection_summaries(index)
            .run_json(checkpointer, || {
                summarize_category(context, &accepted, category)
            })
            .await?;
        category_summaries.push(summaries);
    }

    let mut subsections = Vec::with_capacity(categories.len());
    for (index, (category, summaries)) in categories.iter().zip(&category_summaries).enumerate() {
        let subsection = Stage::subsection(index)
            .run_text(checkpointer, || {
                write_results_subsection(context, &category.name, summaries)
            })
            .await?;
        subsections.push(subsection);
    }

    let results_intro = Stage::results_intro()
        .run_text(checkpointer, || write_results_intro(context, &subsections))
        .await?;
    let limitations = Stage::discussion_limitations()
        .run_text(checkpointer, || {
            write_discussion_limitations(context, &results_intro, &subsections)
        })
        .await?;
    let future_directions = Stage::discussion_future_directions()
        .run_text(checkpointer, || {
            write_discussion_future_directions(context, &results_intro, &subsections)
        })
        .await?;
    let discussion_intro = Stage::discussion_intro()
        .run_text(checkpointer, || {
            write_discussion_intro(context, &limitations, &future_directions)
        })
        .await?;
    timing.end_phase(TimingKeys::COMPOSE);

    // 排版
    timing.start_phase(TimingKeys::OUTPUT);
    let mut sections = vec![methods, results_intro];
    sections.extend(subsections);
    sections.extend([discussion_intro, limitations, future_directions]);

    let draft = PaperDraft {
        title: context.topic().to_string(),
        author: context.config.author.clone(),
        sections,
        bibliography,
    };
    let document_path = outlet::save(context, &draft).await?;
    timing.end_phase(TimingKeys::OUTPUT);

    tracing::info!("📊 {}", checkpointer.generate_report());
    tracing::info!("⏱️ {}", timing.generate_timing_report());
    Ok(document_path)
}

/// 检索词与文章列表同属检索阶段，两个产物都存在才视为完成
async fn collect_articles(context: &GeneratorContext) -> Result<(Vec<String>, Vec<ArticleRecord>)> {
    let checkpointer = context.checkpointer.as_ref();
    let queries_stage = Stage::queries();
    let articles_stage = Stage::article_metadata();

    if checkpointer
        .is_complete(&[queries_stage.key(), articles_stage.key()])
        .await
        && let (Some(queries), Some(articles)) = (
            queries_stage.load_json::<Vec<String>>(checkpointer).await?,
            articles_stage
                .load_json::<Vec<ArticleRecord>>(checkpointer)
                .await?,
        )
    {
        return Ok((queries, articles));
    }

    tracing::info!("▶️ 执行阶段 [{}]", articles_stage.name());
    let (queries, articles) = gather_articles(context).await?;
    articles_stage.save_json(checkpointer, &articles).await?;
    queries_stage.save_json(checkpointer, &queries).await?;
    Ok((queries, articles))
}
