use crate::{Category, Diagnosis, RuleDefinition, Severity, Symptom};

const SYMPTOMS: &[(&str, &str)] = &[
    ("P01", "Indikator Mesin Tidak Menyala"),
    ("P02", "Indikator Baterai Tidak Menyala"),
    ("P03", "Indikator Mesin Menyala"),
    ("P04", "Indikator Baterai Berkedip"),
    ("P05", "Indikator Charge Menyala"),
    ("P06", "Indikator Charge Mati"),
    ("P07", "Indikator Capslock dapat berfungsi"),
    ("P08", "Keyboard tidak dapat digunakan"),
    ("P09", "Touchpad tidak dapat digunakan"),
    ("P10", "Touchpad dapat digunakan"),
    ("P11", "Tombol Sisi Touchpad Berfungsi"),
    ("P12", "Mouse Berfungsi"),
    ("P13", "Mouse tidak berfungsi"),
    ("P14", "Flashdrive atau Harddisk External dapat digunakan"),
    ("P15", "Flashdrive atau Harddisk External tidak dapat digunakan"),
    ("P16", "Camera tidak dapat digunakan"),
    ("P17", "Mic tidak dapat digunakan"),
    ("P18", "Suara dari Speaker Kurang Jelas"),
    ("P19", "Speaker tidak mengeluarkan suara"),
    ("P20", "Speaker mengeluarkan distorsi suara, atau suara tak beraturan"),
    ("P21", "Suara dari Speaker/Headphone Eksternal normal dan jelas"),
    ("P22", "Layar blank"),
    ("P23", "Layar Normal"),
    ("P24", "Layar menyala, tetapi redup dan perlu disenter agar terlihat"),
    ("P25", "Wifi tidak dapat menyala"),
    ("P26", "Wifi tidak dapat terhubung"),
    ("P27", "Bluetooth tidak dapat menyala"),
    ("P28", "Bluetooth tidak dapat terhubung"),
    ("P29", "Monitor tidak dapat terhubung melalui kabel"),
    ("P30", "Monitor tidak dapat terhubung melalui media wireless"),
    ("P31", "Laptop tidak dapat menyala"),
    ("P32", "Laptop Menyala"),
    ("P33", "Charger sudah terpasang"),
    ("P34", "Baterai dapat terisi"),
    ("P35", "Pengunaan RAM Tinggi"),
    ("P36", "Penggunaan CPU Tinggi"),
    ("P37", "Penyimpanan Penuh"),
    ("P38", "Data Sering Hilang atau tidak tersimpan"),
    ("P39", "Laptop Sering Mati Tiba-tiba"),
    ("P40", "Suhu Laptop tidak wajar (Overheat)"),
    ("P41", "Kipas Laptop menyala"),
    ("P42", "Kipas Laptop Tidak Menyala"),
    ("P43", "Sering Freeze"),
    ("P44", "Layar Glitch"),
    ("P45", "Layar Tiba-Tiba Berubah Warna"),
    ("P46", "Muncul Logo OS laptop"),
    ("P47", "Restart Kembali setelah menyala"),
    ("P48", "Muncul peringatan \"repairing your drive\""),
    ("P49", "Kabel sensitif terhadap gerakan"),
    ("P50", "Tangan sering tersetrum saat bersentuhan dengan laptop"),
    ("P51", "Camera dapat digunakan"),
    ("P52", "Mic dapat digunakan"),
    ("P53", "Jam dan Tanggal tidak sesuai yang sebenarnya"),
];

struct RuleEntry {
    id: &'static str,
    conditions: &'static [&'static str],
    name: &'static str,
    category: Category,
    severity: Severity,
    description: &'static str,
    solutions: &'static [&'static str],
}

const RULES: &[RuleEntry] = &[
    RuleEntry {
        id: "R01",
        conditions: &["P02", "P03", "P04", "P05"],
        name: "Baterai Kembung, Bocor, Atau Rusak",
        category: Category::Hardware,
        severity: Severity::Medium,
        description: "Baterai laptop mengalami kerusakan fisik seperti kembung, bocor, atau sudah tidak dapat menyimpan daya dengan baik.",
        solutions: &[
            "Matikan laptop dan lepas baterai segera",
            "Cek kondisi fisik baterai (kembung/bocor)",
            "Jangan gunakan baterai yang kembung (berbahaya)",
            "Ganti dengan baterai baru yang original",
            "Bawa ke service center jika ragu",
        ],
    },
    RuleEntry {
        id: "R02",
        conditions: &["P08", "P07"],
        name: "Keyboard Rusak",
        category: Category::Hardware,
        severity: Severity::Medium,
        description: "Keyboard laptop tidak berfungsi meskipun indikator capslock masih berfungsi, kemungkinan kerusakan hardware keyboard.",
        solutions: &[
            "Coba restart laptop terlebih dahulu",
            "Update atau reinstall driver keyboard",
            "Cek koneksi kabel flexible keyboard (buka casing)",
            "Bersihkan keyboard dari debu dan kotoran",
            "Ganti keyboard laptop jika rusak permanen",
            "Gunakan keyboard eksternal sebagai alternatif sementara",
        ],
    },
    RuleEntry {
        id: "R03",
        conditions: &["P09", "P11"],
        name: "Touchpad Rusak",
        category: Category::Hardware,
        severity: Severity::Low,
        description: "Touchpad tidak dapat digunakan untuk menggerakkan kursor, namun tombol sisi touchpad masih berfungsi.",
        solutions: &[
            "Pastikan touchpad tidak di-disable (Fn + F-key)",
            "Update driver touchpad dari Device Manager",
            "Bersihkan permukaan touchpad dari kotoran",
            "Cek setting touchpad di Windows Settings",
            "Ganti touchpad jika rusak permanen",
            "Gunakan mouse eksternal sebagai alternatif",
        ],
    },
    RuleEntry {
        id: "R04",
        conditions: &["P13", "P15"],
        name: "Port USB Rusak",
        category: Category::Hardware,
        severity: Severity::Medium,
        description: "Port USB tidak dapat mendeteksi perangkat eksternal seperti mouse atau flashdrive/harddisk external.",
        solutions: &[
            "Coba port USB yang berbeda",
            "Test dengan device USB lain (mouse, flashdrive)",
            "Update driver USB controller di Device Manager",
            "Uninstall dan install ulang USB driver",
            "Cek apakah port USB kotor atau patah",
            "Ganti atau repair port USB jika rusak fisik",
        ],
    },
    RuleEntry {
        id: "R05",
        conditions: &["P10", "P13", "P14"],
        name: "Mouse Rusak",
        category: Category::Hardware,
        severity: Severity::Low,
        description: "Mouse eksternal tidak berfungsi meskipun touchpad dan USB port masih normal, kemungkinan mouse yang rusak.",
        solutions: &[
            "Cek koneksi mouse (USB atau wireless)",
            "Ganti baterai mouse jika wireless",
            "Coba port USB lain",
            "Update driver mouse",
            "Test mouse di laptop/PC lain",
            "Ganti mouse jika rusak",
        ],
    },
    RuleEntry {
        id: "R06",
        conditions: &["P16", "P17", "P26"],
        name: "Konektor Fleksibel Kamera dan mic rusak",
        category: Category::Hardware,
        severity: Severity::Medium,
        description: "Camera dan microphone tidak berfungsi karena konektor fleksibel yang rusak atau terlepas.",
        solutions: &[
            "Cek privacy settings untuk camera dan mic",
            "Update driver camera dan audio",
            "Scan dengan Windows troubleshooter",
            "Cek apakah app memiliki permission untuk camera/mic",
            "Buka casing dan cek koneksi kabel flexible",
            "Ganti atau repair konektor flexible",
        ],
    },
    RuleEntry {
        id: "R07",
        conditions: &["P03", "P05", "P07", "P22"],
        name: "RAM Kotor, Kendor, Rusak",
        category: Category::Hardware,
        severity: Severity::Medium,
        description: "Laptop menyala namun layar blank, kemungkinan RAM kotor, kendor, atau rusak sehingga tidak terbaca sistem.",
        solutions: &[
            "Matikan laptop dan lepas baterai",
            "Buka casing dan lepas RAM",
            "Bersihkan konektor RAM dengan penghapus/kuas",
            "Pasang kembali RAM dengan benar hingga klik",
            "Test RAM satu per satu jika ada 2 slot",
            "Ganti RAM jika masih bermasalah",
        ],
    },
    RuleEntry {
        id: "R08",
        conditions: &["P03", "P22", "P24"],
        name: "LED Backlight Layar Rusak",
        category: Category::Hardware,
        severity: Severity::Medium,
        description: "Layar menyala namun sangat redup dan perlu disenter untuk melihat tampilan, menandakan LED backlight rusak.",
        solutions: &[
            "Test dengan monitor eksternal",
            "Atur brightness ke maksimal",
            "Cek inverter backlight",
            "Cek kabel flexible LCD",
            "Ganti LED backlight atau inverter",
            "Pertimbangkan ganti layar LCD jika biaya repair mahal",
        ],
    },
    RuleEntry {
        id: "R09",
        conditions: &["P25", "P26", "P27", "P28", "P30"],
        name: "Network Card Bermasalah",
        category: Category::Hardware,
        severity: Severity::Medium,
        description: "WiFi dan Bluetooth tidak dapat menyala atau terhubung, monitor wireless juga bermasalah, kemungkinan network card rusak.",
        solutions: &[
            "Pastikan airplane mode OFF",
            "Restart router/modem WiFi",
            "Update driver network adapter",
            "Reset network settings Windows",
            "Cek apakah network card terdeteksi di Device Manager",
            "Ganti network card WiFi/Bluetooth jika rusak",
        ],
    },
    RuleEntry {
        id: "R10",
        conditions: &["P26", "P28", "P30"],
        name: "Koneksi wireless Bermasalah",
        category: Category::Software,
        severity: Severity::Low,
        description: "Device wireless dapat menyala namun tidak dapat terhubung, kemungkinan masalah driver atau konfigurasi.",
        solutions: &[
            "Restart laptop dan router",
            "Forget network dan connect ulang",
            "Update driver WiFi dan Bluetooth",
            "Reset network adapter",
            "Cek password WiFi sudah benar",
            "Disable dan enable network adapter",
        ],
    },
    RuleEntry {
        id: "R11",
        conditions: &["P35", "P36", "P37", "P40", "P43", "P44"],
        name: "Terinfeksi Virus, Trojan, dan Malware",
        category: Category::Software,
        severity: Severity::Medium,
        description: "Penggunaan resource tinggi, laptop sering freeze, layar glitch, menandakan infeksi virus/malware yang berat.",
        solutions: &[
            "Scan full system dengan antivirus (Windows Defender atau third-party)",
            "Boot ke Safe Mode dan scan ulang",
            "Hapus program mencurigakan dari Control Panel",
            "Reset browser settings",
            "Gunakan anti-malware tools (Malwarebytes, AdwCleaner)",
            "Backup data dan clean install Windows jika parah",
        ],
    },
    RuleEntry {
        id: "R12",
        conditions: &["P31", "P34", "P39"],
        name: "Konektor Baterai Bermasalah",
        category: Category::Hardware,
        severity: Severity::Medium,
        description: "Laptop tidak dapat menyala dan sering mati tiba-tiba meskipun baterai dapat terisi, menandakan konektor baterai bermasalah.",
        solutions: &[
            "Cek apakah baterai terpasang dengan benar",
            "Lepas dan pasang kembali baterai",
            "Bersihkan konektor baterai dari oksidasi",
            "Cek apakah pin konektor bengkok/patah",
            "Test dengan baterai lain jika ada",
            "Ganti konektor baterai jika rusak",
        ],
    },
    RuleEntry {
        id: "R13",
        conditions: &["P44", "P45", "P29"],
        name: "Graphic Card Bermasalah",
        category: Category::Hardware,
        severity: Severity::High,
        description: "Layar glitch, berubah warna tiba-tiba, dan monitor eksternal tidak berfungsi, menandakan GPU/VGA bermasalah.",
        solutions: &[
            "Update driver VGA/GPU terbaru",
            "Test dengan monitor eksternal melalui kabel",
            "Rollback driver VGA jika masalah baru muncul",
            "Cek temperatur GPU (mungkin overheat)",
            "Bawa ke teknisi untuk reflow/reball GPU chip",
            "Ganti VGA card jika memungkinkan",
        ],
    },
    RuleEntry {
        id: "R14",
        conditions: &["P18", "P19", "P21"],
        name: "Speaker Bermasalah",
        category: Category::Hardware,
        severity: Severity::Low,
        description: "Speaker internal tidak jelas atau tidak mengeluarkan suara, namun audio eksternal normal, menandakan speaker rusak.",
        solutions: &[
            "Cek volume tidak dalam mode mute",
            "Update atau reinstall driver audio",
            "Test dengan headphone eksternal",
            "Run Windows audio troubleshooter",
            "Cek koneksi kabel speaker internal",
            "Ganti speaker laptop jika rusak",
        ],
    },
    RuleEntry {
        id: "R15",
        conditions: &["P01", "P02", "P05", "P20", "P31"],
        name: "IC Charge Bermasalah",
        category: Category::Hardware,
        severity: Severity::High,
        description: "Indikator mesin dan baterai mati, laptop tidak bisa menyala, speaker distorsi, menandakan IC charge rusak.",
        solutions: &[
            "Cek charger dengan multimeter (19V/19.5V)",
            "Coba charger lain yang compatible",
            "Cek port charging apakah longgar/rusak",
            "Periksa IC charging pada motherboard (perlu teknisi)",
            "Ganti IC charging atau motherboard",
            "Jangan paksa charge jika IC sudah rusak (bahaya)",
        ],
    },
    RuleEntry {
        id: "R16",
        conditions: &["P17", "P18", "P20"],
        name: "Arus Bocor pada jalur Audio",
        category: Category::Hardware,
        severity: Severity::Medium,
        description: "Mic tidak berfungsi, speaker kurang jelas dan distorsi, menandakan arus bocor di jalur audio motherboard.",
        solutions: &[
            "Jangan gunakan laptop sambil di-charge saat issue ini terjadi",
            "Cek grounding laptop (gunakan adaptor 3 pin)",
            "Periksa jalur audio pada motherboard",
            "Bawa ke teknisi untuk trace jalur bocor",
            "Ganti komponen audio yang bocor",
            "Gunakan audio eksternal via USB sebagai workaround",
        ],
    },
    RuleEntry {
        id: "R17",
        conditions: &["P32", "P46", "P47"],
        name: "Bootloader Bermasalah",
        category: Category::Software,
        severity: Severity::Medium,
        description: "Laptop menyala, muncul logo OS, tapi restart kembali terus menerus, menandakan bootloader atau OS bermasalah.",
        solutions: &[
            "Masuk ke BIOS dan cek boot order",
            "Repair bootloader dengan Windows installation media",
            "Gunakan command: bootrec /fixmbr, /fixboot, /rebuildbcd",
            "Cek harddisk tidak corrupt dengan CHKDSK",
            "Restore dari system restore point",
            "Reinstall Windows jika bootloader corrupt parah",
        ],
    },
    RuleEntry {
        id: "R18",
        conditions: &["P32", "P46", "P47", "P48"],
        name: "Kesalahan atau kegagalan partisi",
        category: Category::Software,
        severity: Severity::Medium,
        description: "Muncul peringatan \"repairing your drive\" dan restart terus, menandakan partisi harddisk bermasalah atau corrupt.",
        solutions: &[
            "Biarkan proses \"repairing your drive\" selesai (bisa lama)",
            "Jangan matikan paksa laptop saat repair",
            "Gunakan CHKDSK /f /r untuk repair bad sectors",
            "Backup data penting segera setelah bisa masuk Windows",
            "Gunakan partition manager untuk repair partition table",
            "Reinstall Windows jika partition corrupt parah",
        ],
    },
    RuleEntry {
        id: "R19",
        conditions: &["P06", "P39", "P49"],
        name: "Charger Bermasalah",
        category: Category::Hardware,
        severity: Severity::Medium,
        description: "Indikator charge mati, laptop mati tiba-tiba, kabel sensitif terhadap gerakan, menandakan charger rusak.",
        solutions: &[
            "Cek kabel charger apakah ada bagian yang putus",
            "Test dengan multimeter (harus 19V/19.5V stabil)",
            "Coba gerakan kabel, jika nyala-mati berarti kabel putus",
            "Ganti charger baru yang original",
            "Jangan gunakan charger KW atau tidak sesuai spek",
            "Cek port charging laptop juga",
        ],
    },
    RuleEntry {
        id: "R20",
        conditions: &["P20", "P50"],
        name: "Arus Bocor Pada Body",
        category: Category::Hardware,
        severity: Severity::High,
        description: "Tangan tersetrum saat menyentuh laptop, speaker distorsi, menandakan arus bocor yang BERBAHAYA pada body laptop.",
        solutions: &[
            "BAHAYA! Segera hentikan pemakaian laptop",
            "Jangan gunakan laptop sambil di-charge",
            "Gunakan adaptor 3 pin dengan grounding yang baik",
            "Cek body laptop apakah ada komponen yang terkelupas",
            "Bawa ke teknisi SEGERA untuk dicek grounding",
            "Kemungkinan perlu ganti motherboard atau PSU",
        ],
    },
    RuleEntry {
        id: "R21",
        conditions: &["P16", "P52"],
        name: "Camera Terdisable",
        category: Category::Software,
        severity: Severity::Low,
        description: "Camera tidak dapat digunakan namun microphone normal, kemungkinan camera di-disable di system atau privacy settings.",
        solutions: &[
            "Cek Device Manager, pastikan camera enabled",
            "Cek Privacy Settings → Camera → Allow apps",
            "Update driver camera",
            "Cek apakah ada physical switch/button disable camera",
            "Scan dengan hardware troubleshooter",
            "Reinstall camera driver",
        ],
    },
    RuleEntry {
        id: "R22",
        conditions: &["P17", "P51", "P21"],
        name: "Mic Terdisable",
        category: Category::Software,
        severity: Severity::Low,
        description: "Microphone tidak dapat digunakan namun camera dan speaker normal, kemungkinan mic di-disable atau muted.",
        solutions: &[
            "Cek Device Manager, pastikan microphone enabled",
            "Cek Privacy Settings → Microphone → Allow apps",
            "Set microphone sebagai default recording device",
            "Update driver audio",
            "Test dengan Voice Recorder app",
            "Reinstall audio driver",
        ],
    },
    RuleEntry {
        id: "R23",
        conditions: &["P09", "P11", "P12"],
        name: "Touchpad Terdisable",
        category: Category::Software,
        severity: Severity::Low,
        description: "Touchpad tidak berfungsi namun tombol sisi dan mouse eksternal normal, kemungkinan touchpad di-disable.",
        solutions: &[
            "Tekan kombinasi Fn + F-key untuk enable touchpad",
            "Cek Settings → Devices → Touchpad",
            "Cek Device Manager, pastikan touchpad enabled",
            "Nonaktifkan \"Disable touchpad when mouse connected\"",
            "Update driver touchpad",
            "Restart laptop",
        ],
    },
    RuleEntry {
        id: "R24",
        conditions: &["P53"],
        name: "Baterai BIOS",
        category: Category::Hardware,
        severity: Severity::Low,
        description: "Jam dan tanggal selalu reset, menandakan baterai CMOS/BIOS sudah habis dan perlu diganti.",
        solutions: &[
            "Buka casing laptop",
            "Cari baterai CMOS (coin cell CR2032)",
            "Lepas dan ganti dengan baterai baru",
            "Pasang kembali dan setting ulang BIOS",
            "Set tanggal dan waktu yang benar",
            "Save BIOS settings",
        ],
    },
];

pub(crate) fn builtin_symptoms() -> Vec<Symptom> {
    SYMPTOMS
        .iter()
        .map(|(code, description)| Symptom {
            code: (*code).to_string(),
            description: (*description).to_string(),
        })
        .collect()
}

pub(crate) fn builtin_rules() -> Vec<RuleDefinition> {
    RULES
        .iter()
        .map(|entry| RuleDefinition {
            id: entry.id.to_string(),
            conditions: entry.conditions.iter().map(|code| (*code).to_string()).collect(),
            conclusion: Diagnosis {
                name: entry.name.to_string(),
                category: entry.category,
                severity: entry.severity,
                description: entry.description.to_string(),
                solutions: entry.solutions.iter().map(|step| (*step).to_string()).collect(),
            },
        })
        .collect()
}
