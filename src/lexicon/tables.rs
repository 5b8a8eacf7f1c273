//! Static per-family tell tables.
//!
//! These are the curated signals that distinguish languages within one
//! script family: single characters, word endings, and bigrams. Two group
//! keys are reserved: `overlapping` holds signals shared between languages
//! (kept for presence columns, excluded from scoring), `radicals` holds
//! count-only signals for logographic scripts.

use super::ScriptFamily;

/// Raw tell data for one script family.
///
/// Character groups are given as one string per group; its chars are the
/// signals. Endings and bigrams are multi-char strings.
pub(crate) struct FamilyTable {
    pub characters: &'static [(&'static str, &'static str)],
    pub endings: &'static [(&'static str, &'static [&'static str])],
    pub bigrams: &'static [(&'static str, &'static [&'static str])],
}

pub(crate) fn family_table(family: ScriptFamily) -> FamilyTable {
    match family {
        ScriptFamily::PersoArabic => FamilyTable {
            characters: &[
                ("ar", "ةىأإٱكي"),
                ("fa", "ۀ"),
                ("ur", "ٹڈڑےںھۓہ"),
                ("overlapping", "پچژگکی"),
            ],
            endings: &[],
            bigrams: &[],
        },
        ScriptFamily::JaZh => FamilyTable {
            characters: &[
                (
                    "ja",
                    "働込畑辻榊栃峠枠匂駅図経発鉄県斎歳圧緑検関総郷録帰覧剣続涙桜覚広辺対薬軽験\
                     冴畳匠酎丼塚尻曽冨畠鴨鰹圏喩麹渚峯",
                ),
                (
                    "zh",
                    "这那为说谁还没发见观读书车门问间闻风电飞马鸟鱼线网级处张陈员优产币广\
                     國學體經讀圖綠鐵縣亞澤辭總鄉嚴覺櫻營續淚觀變醫臺\
                     仅从众务兰关兴决刘况冲冻净减刚创\
                     齊顏臟廳鬥雞",
                ),
                ("radicals", "氵扌艹言金"),
            ],
            endings: &[],
            bigrams: &[],
        },
        ScriptFamily::EasternSlavic => FamilyTable {
            characters: &[
                ("be", "ў"),
                ("ru", "ъыэё"),
                ("uk", "їєґ"),
                ("overlapping", "і"),
            ],
            endings: &[],
            bigrams: &[],
        },
        ScriptFamily::SouthernSlavic => FamilyTable {
            characters: &[
                ("bg", "ъщ"),
                ("mk", "ѓќѕ"),
                ("sr", "ђћљњџ"),
                ("overlapping", "ј"),
            ],
            endings: &[
                ("bg", &["ът", "ия", "ево", "ово"]),
                ("mk", &["от", "ев", "ов", "ва"]),
                ("sr", &["ије", "ија", "има", "ама", "ска", "ски"]),
                ("overlapping", &["та", "то", "те"]),
            ],
            bigrams: &[
                ("bg", &["ър", "ъл", "ън", "ът", "ят", "ще", "дж"]),
                (
                    "mk",
                    &["ќе", "ќи", "ќа", "ќу", "ѓе", "ѓи", "ѓа", "ѓу", "ѕв", "ѕд"],
                ),
                (
                    "sr",
                    &["ће", "ћа", "ћу", "ћи", "ђа", "ђе", "ђу", "џв", "џа", "џе"],
                ),
            ],
        },
        ScriptFamily::Turkic => FamilyTable {
            characters: &[
                ("kk", "әұі"),
                // kk aside, no unique single-character tells in this family
                ("ky", ""),
                ("mn", ""),
                ("tg", "ҷҳӣӯ"),
                ("overlapping", "ңүөһқғ"),
            ],
            endings: &[],
            bigrams: &[],
        },
        ScriptFamily::Indic => FamilyTable {
            characters: &[
                ("hi", "\u{958}\u{959}\u{95a}\u{95b}\u{95c}\u{95d}\u{95e}\u{95f}"),
                ("mr", "ळऱऑॲॅॉ"),
                ("ne", ""),
                // nukta
                ("overlapping", "\u{93c}"),
            ],
            endings: &[
                (
                    "hi",
                    &["पन", "ता", "कार", "वादी", "गर", "इया", "इन", "ई", "याँ", "यों"],
                ),
                (
                    "mr",
                    &["णे", "तील", "चा", "ची", "चे", "ला", "ना", "कर", "वाला", "पणा"],
                ),
                ("ne", &["हरु", "हरू", "को", "मा", "बाट", "लाई"]),
            ],
            bigrams: &[],
        },
    }
}
