//! Province → autonomous community table
//!
//! The local listing starts at provinces and never says which community
//! they belong to. Names are compared normalized; bilingual names such as
//! "ARABA / ALAVA" also match on either half.

use crate::normalize::normalize_str;

const COMMUNITIES: &[(&str, &[&str])] = &[
    (
        "ANDALUCIA",
        &["ALMERIA", "CADIZ", "CORDOBA", "GRANADA", "HUELVA", "JAEN", "MALAGA", "SEVILLA"],
    ),
    ("ARAGON", &["HUESCA", "TERUEL", "ZARAGOZA"]),
    ("CANARIAS", &["PALMAS", "LAS PALMAS", "TENERIFE", "SANTA CRUZ DE TENERIFE"]),
    ("CANTABRIA", &["CANTABRIA"]),
    (
        "CASTILLA Y LEON",
        &[
            "AVILA", "BURGOS", "LEON", "PALENCIA", "SALAMANCA", "SEGOVIA", "SORIA", "VALLADOLID",
            "ZAMORA",
        ],
    ),
    (
        "CASTILLA-LA MANCHA",
        &["ALBACETE", "CIUDAD REAL", "CUENCA", "GUADALAJARA", "TOLEDO"],
    ),
    ("CATALUNA", &["BARCELONA", "GIRONA", "LLEIDA", "TARRAGONA"]),
    ("CIUDAD AUTONOMA DE CEUTA", &["CEUTA"]),
    ("CIUDAD AUTONOMA DE MELILLA", &["MELILLA"]),
    ("COMUNIDAD DE MADRID", &["MADRID"]),
    ("COMUNIDAD FORAL DE NAVARRA", &["NAFARROA / NAVARRA"]),
    (
        "COMUNITAT VALENCIANA",
        &["ALACANT / ALICANTE", "CASTELLO / CASTELLON", "VALENCIA / VALENCIA"],
    ),
    ("EXTREMADURA", &["BADAJOZ", "CACERES"]),
    ("GALICIA", &["A CORUNA", "CORUNA", "LUGO", "OURENSE", "PONTEVEDRA"]),
    ("ILLES BALEARS", &["ILLES BALEARS / ISLAS BALEARES"]),
    ("LA RIOJA", &["LA RIOJA"]),
    (
        "PAIS VASCO",
        &["ARABA / ALAVA", "BIZKAIA", "VIZCAYA", "GIPUZKOA", "GUIPUZCOA"],
    ),
    ("PRINCIPADO DE ASTURIAS", &["ASTURIAS"]),
    ("REGION DE MURCIA", &["MURCIA"]),
];

/// Community a province belongs to
pub fn community_of(province: &str) -> Option<&'static str> {
    let wanted = halves(province);
    if wanted.is_empty() {
        return None;
    }

    COMMUNITIES
        .iter()
        .find(|(_, provinces)| {
            provinces
                .iter()
                .any(|p| halves(p).iter().any(|h| wanted.contains(h)))
        })
        .map(|(community, _)| *community)
}

/// The normalized full name plus each side of a "/" bilingual name
fn halves(name: &str) -> Vec<String> {
    let mut out: Vec<String> = normalize_str(name).into_iter().collect();
    if name.contains('/') {
        out.extend(name.split('/').filter_map(normalize_str));
    }
    out
}
