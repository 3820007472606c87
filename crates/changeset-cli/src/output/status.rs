use std::fmt::Write;

use changeset_core::BumpType;
use changeset_operations::operations::StatusOutput;
use changeset_project::PreMode;

pub(crate) trait StatusFormatter {
    fn format_status(&self, output: &StatusOutput) -> String;
}

pub(crate) struct PlainTextStatusFormatter;

impl PlainTextStatusFormatter {
    fn format_pre_state(output: &mut String, status: &StatusOutput) {
        let Some(state) = &status.pre_state else {
            return;
        };

        match state.mode {
            PreMode::Pre => {
                let _ = writeln!(
                    output,
                    "Prerelease mode: '{}' (next sequence number {})\n",
                    state.tag, state.sequence_number
                );
            }
            PreMode::Exit => {
                let _ = writeln!(output, "Exiting prerelease mode '{}'\n", state.tag);
            }
        }
    }

    fn format_changesets(output: &mut String, status: &StatusOutput) {
        let changesets = &status.plan.changesets;
        let _ = writeln!(output, "Pending changesets: {}", changesets.len());
        for changeset in changesets {
            let _ = writeln!(output, "  {}", changeset.id);
        }
    }

    fn format_releases(output: &mut String, status: &StatusOutput) {
        if status.plan.versioned().next().is_none() {
            return;
        }

        output.push_str("\nProjected releases:\n");
        for release in status.plan.versioned() {
            let origin = if release.changeset_ids.is_empty() {
                ", dependent"
            } else {
                ""
            };
            let _ = writeln!(
                output,
                "  {}: {} -> {} ({}{origin})",
                release.name, release.old_version, release.new_version, release.bump_type
            );
        }
    }

    fn format_manifest_only(output: &mut String, status: &StatusOutput) {
        let mut names = status
            .plan
            .releases
            .iter()
            .filter(|r| r.bump_type == BumpType::None)
            .map(|r| r.name.as_str())
            .peekable();
        if names.peek().is_none() {
            return;
        }

        output.push_str("\nDependency ranges updated without a release:\n");
        for name in names {
            let _ = writeln!(output, "  {name}");
        }
    }

    fn format_deleted(output: &mut String, status: &StatusOutput) {
        if status.plan.deleted.is_empty() {
            return;
        }

        output.push_str("\nChangesets for deleted packages:\n");
        for deleted in &status.plan.deleted {
            let _ = writeln!(
                output,
                "  {} (from: {})",
                deleted.name,
                deleted.changeset_ids.join(", ")
            );
        }
    }

    fn format_unchanged_packages(output: &mut String, status: &StatusOutput) {
        if status.unchanged_packages.is_empty() {
            return;
        }

        output.push_str("\nPackages without releases:\n");
        for package in &status.unchanged_packages {
            let _ = writeln!(output, "  {} ({})", package.name, package.version);
        }
    }
}

impl StatusFormatter for PlainTextStatusFormatter {
    fn format_status(&self, status: &StatusOutput) -> String {
        let mut output = String::new();

        Self::format_pre_state(&mut output, status);

        if status.plan.changesets.is_empty() && status.plan.is_empty() {
            output.push_str("No pending changesets.\n");
            return output;
        }

        Self::format_changesets(&mut output, status);
        Self::format_releases(&mut output, status);
        Self::format_manifest_only(&mut output, status);
        Self::format_deleted(&mut output, status);
        Self::format_unchanged_packages(&mut output, status);

        output
    }
}
