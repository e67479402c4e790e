/// Rol organizacional resuelto una sola vez al cargar el perfil, a partir del
/// prefijo del cargo. Las reglas de visibilidad del historial dependen de el.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rol {
    Director,
    Coordinador,
    Colaborador,
}

impl Rol {
    pub fn desde_cargo(cargo: &str) -> Rol {
        let cargo = cargo.trim().to_uppercase();
        if cargo.starts_with("DIRECTOR") {
            Rol::Director
        } else if cargo.starts_with("COORDINADOR") {
            Rol::Coordinador
        } else {
            Rol::Colaborador
        }
    }

    /// Solo directores y coordinadores consultan el historial de su centro
    /// de costo.
    pub fn autoriza_historial(&self) -> bool {
        !matches!(self, Rol::Colaborador)
    }

    /// Regla de exclusion cruzada: un director no ve evaluaciones de cargos
    /// COORDINADOR* y un coordinador no ve las de cargos DIRECTOR*, aun
    /// dentro del mismo centro de costo.
    pub fn ve_cargo(&self, cargo_evaluado: &str) -> bool {
        let cargo = cargo_evaluado.trim().to_uppercase();
        match self {
            Rol::Director => !cargo.starts_with("COORDINADOR"),
            Rol::Coordinador => !cargo.starts_with("DIRECTOR"),
            Rol::Colaborador => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resuelve_rol_por_prefijo_del_cargo() {
        assert_eq!(Rol::desde_cargo("DIRECTOR REGIONAL"), Rol::Director);
        assert_eq!(Rol::desde_cargo("COORDINADOR DE ZONA"), Rol::Coordinador);
        assert_eq!(Rol::desde_cargo("AUXILIAR OPERATIVO"), Rol::Colaborador);
        assert_eq!(Rol::desde_cargo("  director comercial "), Rol::Director);
    }

    #[test]
    fn solo_lideres_consultan_historial() {
        assert!(Rol::Director.autoriza_historial());
        assert!(Rol::Coordinador.autoriza_historial());
        assert!(!Rol::Colaborador.autoriza_historial());
    }

    #[test]
    fn director_no_ve_evaluaciones_de_coordinadores() {
        let rol = Rol::desde_cargo("DIRECTOR REGIONAL");
        assert!(!rol.ve_cargo("COORDINADOR DE ZONA"));
        assert!(rol.ve_cargo("AUXILIAR OPERATIVO"));
        assert!(rol.ve_cargo("DIRECTOR COMERCIAL"));
    }

    #[test]
    fn coordinador_no_ve_evaluaciones_de_directores() {
        let rol = Rol::desde_cargo("COORDINADOR DE ZONA");
        assert!(!rol.ve_cargo("DIRECTOR REGIONAL"));
        assert!(rol.ve_cargo("ANALISTA DE CALIDAD"));
    }
}
