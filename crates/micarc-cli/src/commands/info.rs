//! Display WAV file metadata.

use clap::Args;
use micarc_io::{WavFormat, read_wav_channels, read_wav_info};

/// Display WAV file information.
#[derive(Args)]
pub struct InfoArgs {
    /// Path to the WAV file
    pub file: std::path::PathBuf,

    /// Also print the mean and peak amplitude of every channel
    #[arg(long)]
    pub channels: bool,
}

/// Run the info command.
pub fn run(args: InfoArgs) -> anyhow::Result<()> {
    let info = read_wav_info(&args.file)?;
    let spec = info.spec;

    let format_str = match spec.format {
        WavFormat::Pcm => "PCM",
        WavFormat::IeeeFloat => "IEEE Float",
    };

    println!("File:        {}", args.file.display());
    println!("Format:      {} {}-bit", format_str, spec.bits_per_sample);
    println!("Channels:    {}", spec.channels);
    println!("Sample Rate: {} Hz", spec.sample_rate);
    println!(
        "Duration:    {:.3}s ({} frames)",
        info.duration_secs(),
        info.num_frames
    );

    let file_size = std::fs::metadata(&args.file)?.len();
    println!("File Size:   {}", format_bytes(file_size));

    if args.channels {
        let (rows, _) = read_wav_channels(&args.file)?;
        println!();
        println!("{:>4}  {:>10}  {:>10}", "ch", "mean", "peak");
        for (ch, row) in rows.iter().enumerate() {
            let (mean, peak) = mean_and_peak(row);
            println!("{ch:>4}  {mean:>10.4}  {peak:>10.4}");
        }
    }

    Ok(())
}

fn mean_and_peak(samples: &[f32]) -> (f64, f64) {
    if samples.is_empty() {
        return (0.0, 0.0);
    }
    let sum: f64 = samples.iter().map(|&x| f64::from(x)).sum();
    let peak = samples.iter().fold(0.0f32, |acc, x| acc.max(x.abs()));
    (sum / samples.len() as f64, f64::from(peak))
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_pick_a_unit() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MB");
    }

    #[test]
    fn mean_and_peak_of_offset_signal() {
        let (mean, peak) = mean_and_peak(&[0.5, -0.25, 0.5, -0.75]);
        assert_eq!(mean, 0.0);
        assert_eq!(peak, 0.75);
        assert_eq!(mean_and_peak(&[]), (0.0, 0.0));
    }
}
