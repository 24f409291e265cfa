use std::path::{Path, PathBuf};

use crate::domain::{DatasetKind, ResolvedSeries, Scope, Source};
use crate::error::LoadError;
use crate::loader::{DatasetSlot, Loader, Preparation, load_from};

/// Loader for the Italian Civil Protection data.
///
/// The national, regional and provincial families mount independently, each
/// on the first request that needs it.
pub struct ItalyLoader {
    root: PathBuf,
    prep: Preparation,
    country: DatasetSlot,
    regions: DatasetSlot,
    provinces: DatasetSlot,
}

impl ItalyLoader {
    pub fn new(root: &Path, prep: Preparation) -> Self {
        Self {
            root: root.to_path_buf(),
            prep,
            country: DatasetSlot::default(),
            regions: DatasetSlot::default(),
            provinces: DatasetSlot::default(),
        }
    }

    pub fn is_mounted(&self, kind: DatasetKind) -> bool {
        match kind {
            DatasetKind::ItalyCountry => self.country.is_mounted(),
            DatasetKind::ItalyRegions => self.regions.is_mounted(),
            DatasetKind::ItalyProvinces => self.provinces.is_mounted(),
            DatasetKind::World => false,
        }
    }
}

impl Loader for ItalyLoader {
    fn source(&self) -> Source {
        Source::Italy
    }

    fn load(&mut self, field: &str, scope: &Scope) -> Result<ResolvedSeries, LoadError> {
        let (kind, slot) = match scope {
            Scope::National => (DatasetKind::ItalyCountry, &mut self.country),
            Scope::Region(_) => (DatasetKind::ItalyRegions, &mut self.regions),
            Scope::Province(_) => (DatasetKind::ItalyProvinces, &mut self.provinces),
            Scope::Country(name) => {
                return Err(LoadError::RequestConflict(format!(
                    "country '{name}' requested from the Italian data; use the world source."
                )));
            }
        };

        load_from(&mut self.prep, slot, &self.root, Source::Italy, kind, field, scope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Value;
    use crate::loader::LoaderOptions;
    use crate::loader::testing::{CountingRefresh, write_snapshot};
    use crate::patch::NoPatch;

    const COUNTRY_HEADER: &str = "data,stato,ricoverati_con_sintomi,terapia_intensiva,totale_ospedalizzati,\
isolamento_domiciliare,totale_attualmente_positivi,nuovi_attualmente_positivi,dimessi_guariti,deceduti,\
totale_casi,tamponi";

    const REGION_HEADER: &str = "data,stato,codice_regione,denominazione_regione,lat,long,ricoverati_con_sintomi,\
terapia_intensiva,totale_ospedalizzati,isolamento_domiciliare,totale_attualmente_positivi,\
nuovi_attualmente_positivi,dimessi_guariti,deceduti,totale_casi,tamponi";

    /// Three complete days plus an incomplete fourth (dropped at mount).
    fn seed(root: &Path) {
        let national = [(100, 200, 1000), (150, 260, 1200), (135, 300, 1700), (1, 1, 1)];
        for (i, (positives, cases, swabs)) in national.iter().enumerate() {
            let day = format!("2020-03-0{}", i + 1);
            write_snapshot(
                root,
                DatasetKind::ItalyCountry,
                &format!("dpc-covid19-ita-andamento-nazionale-{}.csv", day.replace('-', "")),
                &format!("{COUNTRY_HEADER}\n{day}T18:00:00,ITA,1,2,3,4,{positives},5,6,7,{cases},{swabs}\n"),
            );
            write_snapshot(
                root,
                DatasetKind::ItalyRegions,
                &format!("dpc-covid19-ita-regioni-{}.csv", day.replace('-', "")),
                &format!(
                    "{REGION_HEADER}\n\
                     {day}T18:00:00,ITA,3,Lombardia,45.46,9.19,1,2,3,4,{positives},5,6,7,{cases},{swabs}\n\
                     {day}T18:00:00,ITA,5,Veneto,45.43,12.33,1,2,3,4,10,5,6,7,20,100\n"
                ),
            );
        }
    }

    fn loader(root: &Path) -> (ItalyLoader, CountingRefresh) {
        let refresh = CountingRefresh::default();
        let prep = Preparation::new(Box::new(refresh.clone()), Box::new(NoPatch), LoaderOptions::default());
        (ItalyLoader::new(root, prep), refresh)
    }

    #[test]
    fn national_increments() {
        let tmp = tempfile::tempdir().unwrap();
        seed(tmp.path());
        let (mut italy, _) = loader(tmp.path());

        let series = italy
            .load("incremento_totale_attualmente_positivi", &Scope::National)
            .unwrap();
        assert_eq!(series.time, ["2020-03-01", "2020-03-02", "2020-03-03"]);
        assert_eq!(series.values, [Value::Int(0), Value::Int(50), Value::Int(-15)]);

        let series = italy
            .load("incremento_relativo_percentuale_totale_attualmente_positivi", &Scope::National)
            .unwrap();
        let values: Vec<f64> = series.values.iter().filter_map(Value::as_f64).collect();
        assert_eq!(values.len(), 3);
        assert!((values[1] - 50.0).abs() < 1e-9);
        assert!((values[2] + 10.0).abs() < 1e-9);
    }

    #[test]
    fn refresh_runs_once_and_families_mount_lazily() {
        let tmp = tempfile::tempdir().unwrap();
        seed(tmp.path());
        let (mut italy, refresh) = loader(tmp.path());

        italy.load("totale_casi", &Scope::National).unwrap();
        assert!(italy.is_mounted(DatasetKind::ItalyCountry));
        assert!(!italy.is_mounted(DatasetKind::ItalyRegions));

        let series = italy
            .load("percentuale_tamponi_positivi", &Scope::Region("Veneto".to_string()))
            .unwrap();
        assert_eq!(series.values, vec![Value::Float(20.0); 3]);
        assert!(italy.is_mounted(DatasetKind::ItalyRegions));
        assert!(!italy.is_mounted(DatasetKind::ItalyProvinces));

        assert_eq!(refresh.calls.get(), 1);
    }

    #[test]
    fn unknown_region_is_scope_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        seed(tmp.path());
        let (mut italy, _) = loader(tmp.path());

        let err = italy
            .load("totale_casi", &Scope::Region("Nonexistent".to_string()))
            .unwrap_err();
        assert!(matches!(err, LoadError::ScopeNotFound { ref name, .. } if name == "Nonexistent"));
        assert!(err.to_string().contains("Nonexistent"));
    }

    #[test]
    fn region_over_a_single_dropped_file_is_scope_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        write_snapshot(
            tmp.path(),
            DatasetKind::ItalyRegions,
            "dpc-covid19-ita-regioni-20200301.csv",
            &format!("{REGION_HEADER}\n2020-03-01T18:00:00,ITA,3,Lombardia,45.46,9.19,1,2,3,4,5,5,6,7,8,9\n"),
        );
        let (mut italy, _) = loader(tmp.path());

        let err = italy
            .load("totale_casi", &Scope::Region("Nonexistent".to_string()))
            .unwrap_err();
        assert!(matches!(err, LoadError::ScopeNotFound { ref name, .. } if name == "Nonexistent"));
        assert!(italy.is_mounted(DatasetKind::ItalyRegions));
    }

    #[test]
    fn typo_is_field_name_error_before_any_io() {
        let tmp = tempfile::tempdir().unwrap();
        let (mut italy, refresh) = loader(tmp.path());

        let err = italy.load("totale_cas", &Scope::National).unwrap_err();
        assert!(matches!(err, LoadError::FieldName(ref f) if f == "totale_cas"));
        assert_eq!(refresh.calls.get(), 0);
    }

    #[test]
    fn country_scope_conflicts() {
        let tmp = tempfile::tempdir().unwrap();
        let (mut italy, _) = loader(tmp.path());

        let err = italy.load("totale_casi", &Scope::Country("Italy".to_string())).unwrap_err();
        assert!(matches!(err, LoadError::RequestConflict(_)));
    }
}
