//! The standard Linux log families, in ingestion order.

use std::path::Path;

use crate::DecoderKind;
use crate::LogFamily;

/// `(name, path under the root, decoder, description)`.
const LINUX_FAMILIES: &[(&str, &str, DecoderKind, &str)] = &[
    (
        "dmesg log",
        "var/log/dmesg",
        DecoderKind::DmesgOffset,
        "Kernel ring buffer: hardware detected by the kernel while booting, as printed by `dmesg`.",
    ),
    (
        "xorg log",
        "var/log/Xorg",
        DecoderKind::XorgOffset,
        "Messages from the X server.",
    ),
    (
        "messages log",
        "var/log/messages",
        DecoderKind::StandardSyslog,
        "Global system messages, including those logged during startup (mail, cron, daemon, kern, auth).",
    ),
    (
        "syslog log",
        "var/log/syslog",
        DecoderKind::StandardSyslog,
        "Syslog messages from local daemons and network devices.",
    ),
    (
        "auth log",
        "var/log/auth",
        DecoderKind::StandardSyslog,
        "System authorization information: user logins and the authentication mechanisms used.",
    ),
    (
        "dpkg log",
        "var/log/dpkg",
        DecoderKind::IsoPrefixed,
        "Package installs and upgrades made through dpkg, apt-get, synaptic or aptitude.",
    ),
    (
        "kern log",
        "var/log/kern",
        DecoderKind::StandardSyslog,
        "Messages logged by the kernel.",
    ),
    (
        "cron log",
        "var/log/cron",
        DecoderKind::StandardSyslog,
        "Jobs started by the cron (or anacron) daemon.",
    ),
    (
        "daemon log",
        "var/log/daemon",
        DecoderKind::StandardSyslog,
        "Messages from background daemons.",
    ),
    (
        "alternatives log",
        "var/log/alternatives",
        DecoderKind::IsoAfterToken,
        "Symbolic link changes made by update-alternatives.",
    ),
    (
        "cups access log",
        "var/log/cups/access_log",
        DecoderKind::BracketedApache,
        "HTTP resources requested from the CUPS print server, in Common Log Format.",
    ),
    (
        "user log",
        "var/log/user",
        DecoderKind::StandardSyslog,
        "User-level messages.",
    ),
    (
        "utmp & wtmp logs",
        "var/log/wtmp",
        DecoderKind::SessionHistory,
        "Login history: sessions per terminal, logouts and system boots, as shown by `last -f`.",
    ),
    (
        "btmp log",
        "var/log/btmp",
        DecoderKind::FailedLogin,
        "Failed login attempts, as shown by `last -f`.",
    ),
];

/// Families of a Linux system whose filesystem is mounted at `root` (`/` for
/// the live system, or the directory a disk image was extracted to).
pub fn linux_families(root: &Path) -> Vec<LogFamily> {
    LINUX_FAMILIES
        .iter()
        .map(|&(name, relative, decoder, description)| {
            LogFamily::new(name, root.join(relative), description, decoder)
        })
        .collect()
}
