//! `phonowave analyze` command - Extract phonetic features from WAV files.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use colored::Colorize;
use serde::Serialize;
use tracing::debug;

use phonowave_analysis::{AudioClip, FeatureExtractor, FeatureRecord};

use crate::config::FileConfig;
use crate::error::{CliError, CliResult};

use super::OutputFormat;

/// Features of one input file.
#[derive(Debug, Serialize)]
pub struct FileReport {
    /// Input path.
    pub file: PathBuf,
    /// Extracted features.
    pub record: FeatureRecord,
}

/// Build the extractor from the `[analysis]` section and flag overrides.
pub fn build_extractor(config: Option<&Path>, mfcc: Option<usize>) -> CliResult<FeatureExtractor> {
    let mut analysis = FileConfig::load(config)?.analysis;
    if let Some(num_mfcc) = mfcc {
        analysis = analysis.with_num_mfcc(num_mfcc);
    }
    Ok(FeatureExtractor::new(analysis)?)
}

/// Analyze every file concurrently, returning reports in input order.
pub async fn analyze_files(
    extractor: Arc<FeatureExtractor>,
    files: &[PathBuf],
) -> CliResult<Vec<FileReport>> {
    let tasks: Vec<_> = files
        .iter()
        .cloned()
        .map(|file| {
            let extractor = extractor.clone();
            tokio::task::spawn_blocking(move || -> CliResult<FileReport> {
                let clip = AudioClip::from_wav(&file)?;
                debug!(
                    "Loaded {} ({} samples at {} Hz)",
                    file.display(),
                    clip.len(),
                    clip.sample_rate()
                );
                let record = extractor.extract(&clip);
                Ok(FileReport { file, record })
            })
        })
        .collect();

    let mut reports = Vec::with_capacity(tasks.len());
    for task in tasks {
        reports.push(task.await??);
    }
    Ok(reports)
}

/// Execute the `analyze` command.
pub async fn execute(
    files: &[PathBuf],
    config: Option<&Path>,
    format: OutputFormat,
    mfcc: Option<usize>,
    quiet: bool,
) -> CliResult<()> {
    if files.is_empty() {
        return Err(CliError::InvalidArgument(
            "at least one input file is required".to_string(),
        ));
    }

    let extractor = Arc::new(build_extractor(config, mfcc)?);

    if format == OutputFormat::Text && !quiet {
        println!(
            "{} Analyzing {} file(s)",
            "→".bright_cyan(),
            files.len().to_string().bright_white()
        );
        println!();
    }

    let reports = analyze_files(extractor, files).await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
        OutputFormat::Text => {
            for report in &reports {
                print_report(report);
            }
        }
    }
    Ok(())
}

fn print_report(report: &FileReport) {
    let record = &report.record;
    let summary = &record.summary;

    println!(
        "{}:",
        report.file.display().to_string().bright_white().underline()
    );
    println!(
        "  {} {}",
        "Sound type:".dimmed(),
        summary.sound_type.label().bright_yellow()
    );

    let score = summary.quality.score.to_string();
    let score = match summary.quality.score {
        80..=100 => score.bright_green(),
        50..=79 => score.yellow(),
        _ => score.bright_red(),
    };
    if summary.quality.issues.is_empty() {
        println!("  {} {}", "Quality:".dimmed(), score);
    } else {
        println!(
            "  {} {} ({})",
            "Quality:".dimmed(),
            score,
            summary.quality.issues.join(", ")
        );
    }

    println!(
        "  {} {:.3} s at {} Hz",
        "Duration:".dimmed(),
        record.duration,
        record.sample_rate
    );
    println!(
        "  {} {:.0}% voiced, {} segment(s)",
        "Voicing:".dimmed(),
        record.voicing.ratio * 100.0,
        record.voicing.intervals.len()
    );
    if record.pitch.mean > 0.0 {
        println!(
            "  {} mean {:.1} Hz (range {:.1}-{:.1})",
            "Pitch:".dimmed(),
            record.pitch.mean,
            record.pitch.min,
            record.pitch.max
        );
    }
    println!(
        "  {} F1 {:.0} Hz, F2 {:.0} Hz, F3 {:.0} Hz",
        "Formants:".dimmed(),
        record.formants.f1.frequency,
        record.formants.f2.frequency,
        record.formants.f3.frequency
    );
    println!(
        "  {} centroid {:.0} Hz, brightness {:.2}, ZCR {:.3}",
        "Spectrum:".dimmed(),
        record.spectral.centroid,
        record.spectral.brightness,
        record.zero_crossing.mean
    );
    println!(
        "  {} {}",
        "MFCC:".dimmed(),
        record
            .mfcc
            .iter()
            .map(|c| format!("{:.2}", c))
            .collect::<Vec<_>>()
            .join(" ")
    );

    if !summary.characteristics.is_empty() {
        println!(
            "  {} {}",
            "Characteristics:".dimmed(),
            summary.characteristics.join(", ")
        );
    }
    for hint in &summary.hints {
        println!("  {} {}", "•".dimmed(), hint);
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;
    use std::fs;

    fn write_tone(path: &Path, frequency: f32) {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 44_100,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for i in 0..8820 {
            let s = 0.5 * (2.0 * PI * frequency * i as f32 / 44_100.0).sin();
            writer.write_sample((s * 32767.0) as i16).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_build_extractor_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("analysis.toml");
        fs::write(&path, "[analysis]\nnum_mfcc = 20\nmin_pitch = 60.0\n").unwrap();

        let from_file = build_extractor(Some(&path), None).unwrap();
        assert_eq!(from_file.config().num_mfcc, 20);
        assert_eq!(from_file.config().min_pitch, 60.0);

        let overridden = build_extractor(Some(&path), Some(8)).unwrap();
        assert_eq!(overridden.config().num_mfcc, 8);
    }

    #[tokio::test]
    async fn test_reports_keep_input_order() {
        let dir = tempfile::tempdir().unwrap();
        let low = dir.path().join("low.wav");
        let high = dir.path().join("high.wav");
        write_tone(&low, 150.0);
        write_tone(&high, 250.0);

        let extractor = Arc::new(FeatureExtractor::default());
        let reports = analyze_files(extractor, &[high.clone(), low.clone()])
            .await
            .unwrap();

        assert_eq!(reports[0].file, high);
        assert_eq!(reports[1].file, low);
        assert!(reports[0].record.pitch.mean > reports[1].record.pitch.mean);
    }

    #[tokio::test]
    async fn test_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = analyze_files(
            Arc::new(FeatureExtractor::default()),
            &[dir.path().join("missing.wav")],
        )
        .await;
        assert!(matches!(result, Err(CliError::Analysis(_))));
    }

    #[tokio::test]
    async fn test_execute_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        write_tone(&path, 200.0);
        execute(&[path], None, OutputFormat::Json, Some(5), true)
            .await
            .unwrap();
    }
}
